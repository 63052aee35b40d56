use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::CurrentActor;
use crate::models::task::{Task, TaskCreateRequest, TaskUpdateRequest, TaskWithProject};
use crate::services;

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "All tasks with their project name, by start date", body = [TaskWithProject]))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<TaskWithProject>>> {
    Ok(Json(services::tasks::list_tasks(&state, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/tasks",
    tag = "Tasks",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Tasks of the project", body = [Task]))
)]
pub async fn list_project_tasks(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(
        services::tasks::list_project_tasks(&state, &actor, project_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    tag = "Tasks",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = TaskCreateRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid input or department mismatch"),
        (status = 403, description = "Not permitted in this department")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = services::tasks::create_task(&state, &actor, project_id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = TaskUpdateRequest,
    responses((status = 200, description = "Task updated", body = Task))
)]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskUpdateRequest>,
) -> AppResult<Json<Task>> {
    Ok(Json(services::tasks::update_task(&state, &actor, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    responses((status = 204, description = "Task deleted"))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::tasks::delete_task(&state, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
