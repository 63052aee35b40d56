use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::CurrentActor;
use crate::models::department::{Department, DepartmentRequest};
use crate::services;

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Departments ordered by name", body = [Department]))
)]
pub async fn list_departments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<Department>>> {
    Ok(Json(services::departments::list_departments(&state, &actor).await?))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    security(("bearerAuth" = [])),
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Name missing"),
        (status = 403, description = "Not a system administrator")
    )
)]
pub async fn create_department(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<DepartmentRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    let department = services::departments::create_department(&state, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    responses((status = 200, description = "Department", body = Department))
)]
pub async fn get_department(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    Ok(Json(services::departments::get_department(&state, &actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    request_body = DepartmentRequest,
    responses((status = 200, description = "Department renamed", body = Department))
)]
pub async fn rename_department(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<DepartmentRequest>,
) -> AppResult<Json<Department>> {
    Ok(Json(
        services::departments::rename_department(&state, &actor, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 409, description = "Department still owns projects")
    )
)]
pub async fn delete_department(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::departments::delete_department(&state, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
