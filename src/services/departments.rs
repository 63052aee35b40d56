use uuid::Uuid;

use super::authorize;
use crate::app::AppState;
use crate::authz::{require_approved, Actor, Permission, ResourceContext};
use crate::errors::{AppError, AppResult};
use crate::models::department::{Department, DepartmentRequest};
use crate::utils::{require_non_blank, utc_now};

pub async fn list_departments(state: &AppState, actor: &Actor) -> AppResult<Vec<Department>> {
    require_approved(actor)?;
    state.repo.list_departments().await
}

pub async fn get_department(state: &AppState, actor: &Actor, id: Uuid) -> AppResult<Department> {
    require_approved(actor)?;
    state
        .repo
        .get_department(id)
        .await?
        .ok_or_else(|| AppError::not_found("department not found"))
}

pub async fn create_department(state: &AppState, actor: &Actor, request: DepartmentRequest) -> AppResult<Department> {
    let name = require_non_blank("name", &request.name)?;
    authorize(state, actor, Permission::ManageDepartments, &ResourceContext::new())?;

    let department = Department {
        id: Uuid::new_v4(),
        name,
        created_at: utc_now(),
    };
    state.repo.insert_department(&department).await?;

    tracing::info!(department_id = %department.id, "department created");
    Ok(department)
}

pub async fn rename_department(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    request: DepartmentRequest,
) -> AppResult<Department> {
    let name = require_non_blank("name", &request.name)?;
    authorize(state, actor, Permission::ManageDepartments, &ResourceContext::new())?;

    if !state.repo.rename_department(id, &name).await? {
        return Err(AppError::not_found("department not found"));
    }

    state
        .repo
        .get_department(id)
        .await?
        .ok_or_else(|| AppError::not_found("department not found"))
}

/// Refused while the department still owns projects; never cascades.
pub async fn delete_department(state: &AppState, actor: &Actor, id: Uuid) -> AppResult<()> {
    authorize(state, actor, Permission::ManageDepartments, &ResourceContext::new())?;

    let projects = state.repo.count_projects_in_department(id).await?;
    if projects > 0 {
        return Err(AppError::conflict(format!(
            "cannot delete a department that still has {projects} project(s); delete or move them first"
        )));
    }

    if !state.repo.delete_department(id).await? {
        return Err(AppError::not_found("department not found"));
    }

    tracing::info!(department_id = %id, "department deleted");
    Ok(())
}
