use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::CurrentActor;
use crate::models::user::{SuccessResponse, SyncResponse, UserUpdateRequest, UserWithDepartment};
use crate::services;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Mirrored users with their department", body = [UserWithDepartment]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<UserWithDepartment>>> {
    Ok(Json(services::users::list_users(&state, &actor).await?))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Identity id")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = SuccessResponse),
        (status = 400, description = "Invalid role, department or payload"),
        (status = 401, description = "Not a system administrator"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdateRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse>> {
    // Non-sysadmins are turned away before the body is parsed.
    services::users::require_user_admin(&state, &actor)?;
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    services::users::update_user(&state, &actor, &id, payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Identity id")),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 401, description = "Not a system administrator")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    services::users::delete_user(&state, &actor, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    post,
    path = "/api/users/sync",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Missing mirror rows created", body = SyncResponse),
        (status = 401, description = "Not a system administrator")
    )
)]
pub async fn sync_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<SyncResponse>> {
    let created = services::users::sync_users(&state, &actor).await?;
    Ok(Json(SyncResponse { success: true, created }))
}
