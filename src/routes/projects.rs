use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::CurrentActor;
use crate::models::project::{
    AttachmentRemoveRequest, Project, ProjectCreateRequest, ProjectDeleteQuery, ProjectUpdateRequest,
    ProjectWithTasks,
};
use crate::services;

#[utoipa::path(
    get,
    path = "/api/departments/{id}/projects",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    responses((status = 200, description = "Projects with their tasks, newest first", body = [ProjectWithTasks]))
)]
pub async fn list_department_projects(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProjectWithTasks>>> {
    Ok(Json(
        services::projects::list_projects(&state, &actor, department_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/departments/{id}/projects",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    request_body = ProjectCreateRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 403, description = "Not permitted in this department")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<ProjectCreateRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = services::projects::create_project(&state, &actor, department_id, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Project detail", body = ProjectWithTasks))
)]
pub async fn get_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProjectWithTasks>> {
    Ok(Json(services::projects::get_project(&state, &actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = ProjectUpdateRequest,
    responses((status = 200, description = "Project updated", body = Project))
)]
pub async fn update_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectUpdateRequest>,
) -> AppResult<Json<Project>> {
    Ok(Json(
        services::projects::update_project(&state, &actor, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id"), ProjectDeleteQuery),
    responses(
        (status = 204, description = "Project and its tasks deleted"),
        (status = 403, description = "Not permitted from this department")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Query(query): Query<ProjectDeleteQuery>,
) -> AppResult<StatusCode> {
    services::projects::delete_project(&state, &actor, id, query.department_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}/attachments",
    tag = "Projects",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = AttachmentRemoveRequest,
    responses(
        (status = 200, description = "Attachment removed", body = Project),
        (status = 404, description = "No such attachment on the project")
    )
)]
pub async fn remove_attachment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentRemoveRequest>,
) -> AppResult<Json<Project>> {
    Ok(Json(
        services::projects::remove_attachment(&state, &actor, id, &payload.url).await?,
    ))
}
