use std::collections::HashSet;

use uuid::Uuid;

use super::authorize;
use crate::app::AppState;
use crate::authz::{require_approved, Actor, Permission, ResourceContext, Role};
use crate::errors::{AppError, AppResult};
use crate::identity::{Identity, IdentityUpdate, PublicMetadata, DEFAULT_ROLE};
use crate::models::user::{User, UserUpdateRequest, UserWithDepartment};
use crate::utils::{non_blank, utc_now};

pub const SYSADMIN_ROLE: &str = "sysadmin";

pub async fn list_users(state: &AppState, actor: &Actor) -> AppResult<Vec<UserWithDepartment>> {
    require_approved(actor)?;
    state.repo.list_users().await
}

/// Validated form of a [`UserUpdateRequest`].
struct UserChanges {
    first_name: Option<String>,
    last_name: Option<String>,
    metadata: PublicMetadata,
    department_id: Option<Uuid>,
}

fn validate_update(request: UserUpdateRequest) -> AppResult<UserChanges> {
    let metadata = PublicMetadata {
        role: Some(request.role),
        department_id: request.department_id,
        department_head: Some(request.department_head),
        position: request.position,
    }
    .normalized();

    if Role::parse(metadata.role.as_deref()) == Role::Unknown {
        return Err(AppError::bad_request("role must be one of member, admin, sysadmin"));
    }

    let department_id = metadata
        .department_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| AppError::bad_request("department_id must be a valid UUID"))?;

    if metadata.is_department_head() && department_id.is_none() {
        return Err(AppError::bad_request("a department head must belong to a department"));
    }

    Ok(UserChanges {
        first_name: non_blank(request.first_name.as_deref()).map(str::to_string),
        last_name: non_blank(request.last_name.as_deref()).map(str::to_string),
        metadata,
        department_id,
    })
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [first, last].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Sysadmin gate for user administration; denial is `Unauthorized`.
pub fn require_user_admin(state: &AppState, actor: &Actor) -> AppResult<()> {
    authorize(state, actor, Permission::EditUser, &ResourceContext::new())
}

/// Writes the mirror row first, then the identity-provider metadata.
/// The caller's rights are checked before the payload is looked at.
pub async fn update_user(state: &AppState, actor: &Actor, id: &str, request: UserUpdateRequest) -> AppResult<()> {
    require_user_admin(state, actor)?;
    let changes = validate_update(request)?;

    if let Some(department_id) = changes.department_id {
        if state.repo.get_department(department_id).await?.is_none() {
            return Err(AppError::not_found("department not found"));
        }
    }

    let now = utc_now();
    let mut user = match state.repo.get_user(id).await? {
        Some(existing) => existing.user,
        None => {
            let identity = state
                .identity
                .get_identity(id)
                .await?
                .ok_or_else(|| AppError::not_found("user not found"))?;
            new_mirror_row(&identity, &identity.public_metadata.normalized())?
        }
    };

    if let Some(full_name) = join_name(changes.first_name.as_deref(), changes.last_name.as_deref()) {
        user.full_name = Some(full_name);
    }
    user.role = changes.metadata.role.clone().unwrap_or_else(|| DEFAULT_ROLE.to_string());
    user.position = changes.metadata.position.clone();
    user.department_id = changes.department_id;
    user.department_head = changes.metadata.is_department_head();
    user.updated_at = now;
    state.repo.upsert_user(&user).await?;

    let update = IdentityUpdate {
        first_name: changes.first_name,
        last_name: changes.last_name,
        public_metadata: changes.metadata,
    };
    state.identity.update_identity(id, &update).await?;

    tracing::info!(user_id = %id, role = %user.role, "user updated");
    Ok(())
}

/// Deletes the account at the identity provider, then the mirror row.
pub async fn delete_user(state: &AppState, actor: &Actor, id: &str) -> AppResult<()> {
    authorize(state, actor, Permission::ManageUsers, &ResourceContext::new())?;

    match state.identity.delete_identity(id).await {
        Ok(()) => {}
        Err(AppError::NotFound(_)) => {
            tracing::warn!(user_id = %id, "identity already absent at provider");
        }
        Err(err) => return Err(err),
    }

    let removed = state.repo.delete_user(id).await?;
    tracing::info!(user_id = %id, mirror_row_removed = removed, "user deleted");
    Ok(())
}

/// Creates mirror rows for provider accounts that have none. Accounts without
/// an email are skipped; a failed insert is logged and the sync continues.
pub async fn sync_users(state: &AppState, actor: &Actor) -> AppResult<usize> {
    authorize(state, actor, Permission::ManageUsers, &ResourceContext::new())?;

    let (identities, existing) = tokio::try_join!(state.identity.list_identities(), state.repo.list_users())?;
    let known: HashSet<String> = existing.into_iter().map(|record| record.user.id).collect();

    let mut created = 0;
    for identity in identities.iter().filter(|identity| !known.contains(&identity.id)) {
        let metadata = identity.public_metadata.normalized();
        let user = match new_mirror_row(identity, &metadata) {
            Ok(user) => user,
            Err(_) => {
                tracing::warn!(user_id = %identity.id, "skipping identity without email");
                continue;
            }
        };

        match state.repo.upsert_user(&user).await {
            Ok(()) => created += 1,
            Err(err) => tracing::error!(user_id = %identity.id, error = ?err, "failed to mirror identity"),
        }
    }

    tracing::info!(created, "user mirror synchronised");
    Ok(created)
}

/// Handles `user.created`: applies defaults (and the bootstrap sysadmin role)
/// to the account's metadata, pushes them back to the provider, and writes the
/// mirror row. A provider write failure does not stop the mirror write.
pub async fn mirror_created_identity(state: &AppState, identity: &Identity) -> AppResult<User> {
    let email = identity
        .primary_email()
        .ok_or_else(|| AppError::bad_request("identity has no email address"))?;

    let mut metadata = identity.public_metadata.normalized();
    if state.webhook.is_bootstrap_sysadmin(email) {
        tracing::info!(user_id = %identity.id, "assigning bootstrap sysadmin role");
        metadata.role = Some(SYSADMIN_ROLE.to_string());
    } else if metadata.role.is_none() {
        metadata.role = Some(DEFAULT_ROLE.to_string());
    }

    let update = IdentityUpdate {
        first_name: None,
        last_name: None,
        public_metadata: metadata.clone(),
    };
    if let Err(err) = state.identity.update_identity(&identity.id, &update).await {
        tracing::error!(user_id = %identity.id, error = ?err, "failed to write default metadata to identity provider");
    }

    let user = new_mirror_row(identity, &metadata)?;
    state.repo.upsert_user(&user).await?;
    tracing::info!(user_id = %identity.id, role = %user.role, "user mirrored");
    Ok(user)
}

/// Handles `user.deleted`.
pub async fn remove_deleted_identity(state: &AppState, id: &str) -> AppResult<bool> {
    let id = non_blank(Some(id)).ok_or_else(|| AppError::bad_request("event has no user id"))?;
    let removed = state.repo.delete_user(id).await?;
    tracing::info!(user_id = %id, removed, "user mirror row deleted");
    Ok(removed)
}

fn new_mirror_row(identity: &Identity, metadata: &PublicMetadata) -> AppResult<User> {
    let email = identity
        .primary_email()
        .ok_or_else(|| AppError::bad_request("identity has no email address"))?;
    let department_id = metadata
        .department_id
        .as_deref()
        .and_then(|value| Uuid::parse_str(value).ok());
    let now = utc_now();

    Ok(User {
        id: identity.id.clone(),
        email: email.to_string(),
        full_name: identity.full_name(),
        role: metadata.role.clone().unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        position: metadata.position.clone(),
        department_id,
        department_head: department_id.is_some() && metadata.is_department_head(),
        created_at: now,
        updated_at: now,
    })
}
