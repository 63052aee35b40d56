use uuid::Uuid;

use super::authorize;
use crate::app::AppState;
use crate::authz::{require_approved, Actor, Permission, ResourceContext};
use crate::errors::{AppError, AppResult};
use crate::models::task::{Task, TaskCreateRequest, TaskUpdateRequest, TaskWithProject};
use crate::utils::{non_blank, require_non_blank, utc_now, validate_date_range};

async fn find_task(state: &AppState, id: Uuid) -> AppResult<Task> {
    state
        .repo
        .get_task(id)
        .await?
        .ok_or_else(|| AppError::not_found("task not found"))
}

pub async fn list_tasks(state: &AppState, actor: &Actor) -> AppResult<Vec<TaskWithProject>> {
    require_approved(actor)?;
    state.repo.list_tasks().await
}

pub async fn list_project_tasks(state: &AppState, actor: &Actor, project_id: Uuid) -> AppResult<Vec<Task>> {
    require_approved(actor)?;

    if state.repo.get_project(project_id).await?.is_none() {
        return Err(AppError::not_found("project not found"));
    }
    state.repo.list_tasks_for_project(project_id).await
}

/// The task inherits the project's department. A caller-supplied department
/// that disagrees is rejected.
pub async fn create_task(
    state: &AppState,
    actor: &Actor,
    project_id: Uuid,
    request: TaskCreateRequest,
) -> AppResult<Task> {
    let title = require_non_blank("title", &request.title)?;
    validate_date_range(request.start_date, request.end_date)?;

    let project = state
        .repo
        .get_project(project_id)
        .await?
        .ok_or_else(|| AppError::not_found("project not found"))?;

    if let Some(department_id) = request.department_id {
        if department_id != project.department_id {
            return Err(AppError::bad_request(
                "department_id must match the project's department",
            ));
        }
    }

    authorize(
        state,
        actor,
        Permission::CreateTask,
        &ResourceContext::new().with_department(project.department_id),
    )?;

    let now = utc_now();
    let task = Task {
        id: Uuid::new_v4(),
        project_id,
        department_id: project.department_id,
        title,
        description: non_blank(request.description.as_deref()).map(str::to_string),
        status: request.status.unwrap_or_default(),
        assigned_to: non_blank(request.assigned_to.as_deref()).map(str::to_string),
        start_date: request.start_date,
        end_date: request.end_date,
        created_by: actor.id.clone(),
        created_at: now,
        updated_at: now,
    };
    state.repo.insert_task(&task).await?;

    tracing::info!(task_id = %task.id, project_id = %project_id, "task created");
    Ok(task)
}

/// Re-checked against the task's stored department.
pub async fn update_task(state: &AppState, actor: &Actor, id: Uuid, request: TaskUpdateRequest) -> AppResult<Task> {
    let title = request
        .title
        .as_deref()
        .map(|title| require_non_blank("title", title))
        .transpose()?;

    let mut task = find_task(state, id).await?;
    authorize(
        state,
        actor,
        Permission::EditTask,
        &ResourceContext::new().with_department(task.department_id),
    )?;

    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = request.description {
        task.description = non_blank(Some(description.as_str())).map(str::to_string);
    }
    if let Some(status) = request.status {
        task.status = status;
    }
    if let Some(assigned_to) = request.assigned_to {
        task.assigned_to = non_blank(Some(assigned_to.as_str())).map(str::to_string);
    }
    if request.start_date.is_some() {
        task.start_date = request.start_date;
    }
    if request.end_date.is_some() {
        task.end_date = request.end_date;
    }
    validate_date_range(task.start_date, task.end_date)?;
    task.updated_at = utc_now();

    if !state.repo.update_task(&task).await? {
        return Err(AppError::not_found("task not found"));
    }
    Ok(task)
}

pub async fn delete_task(state: &AppState, actor: &Actor, id: Uuid) -> AppResult<()> {
    let task = find_task(state, id).await?;
    authorize(
        state,
        actor,
        Permission::DeleteTask,
        &ResourceContext::new().with_department(task.department_id),
    )?;

    if !state.repo.delete_task(id).await? {
        return Err(AppError::not_found("task not found"));
    }

    tracing::info!(task_id = %id, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Role;
    use crate::db::Repository;
    use crate::models::department::Department;
    use crate::models::project::Project;
    use crate::models::task::TaskStatus;
    use crate::services::fakes::{harness, Harness};

    async fn project_in_new_department(h: &Harness) -> Project {
        let now = utc_now();
        let department = Department {
            id: Uuid::new_v4(),
            name: "Estate".to_string(),
            created_at: now,
        };
        h.repo.insert_department(&department).await.unwrap();

        let project = Project {
            id: Uuid::new_v4(),
            name: "Survey".to_string(),
            description: None,
            start_date: None,
            end_date: None,
            department_id: department.id,
            created_by: None,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        h.repo.insert_project(&project).await.unwrap();
        project
    }

    fn head_of(department_id: Uuid) -> Actor {
        Actor::new("user_head", Role::Member)
            .with_department(department_id)
            .as_department_head()
    }

    fn request(department_id: Option<Uuid>) -> TaskCreateRequest {
        TaskCreateRequest {
            title: "Walk boundary".to_string(),
            description: None,
            status: None,
            assigned_to: Some("user_surveyor".to_string()),
            start_date: None,
            end_date: None,
            department_id,
        }
    }

    #[tokio::test]
    async fn task_copies_project_department() {
        let h = harness();
        let project = project_in_new_department(&h).await;

        let task = create_task(&h.state, &head_of(project.department_id), project.id, request(None))
            .await
            .unwrap();
        assert_eq!(task.department_id, project.department_id);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn mismatched_department_is_a_validation_failure() {
        let h = harness();
        let project = project_in_new_department(&h).await;

        let err = create_task(
            &h.state,
            &Actor::new("user_root", Role::Sysadmin),
            project.id,
            request(Some(Uuid::new_v4())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!h.repo.called("insert_task"));
    }

    #[tokio::test]
    async fn edits_are_rechecked_against_stored_department() {
        let h = harness();
        let project = project_in_new_department(&h).await;
        let task = create_task(&h.state, &head_of(project.department_id), project.id, request(None))
            .await
            .unwrap();

        let outsider = head_of(Uuid::new_v4());
        let update = TaskUpdateRequest {
            title: None,
            description: None,
            status: Some(TaskStatus::Completed),
            assigned_to: None,
            start_date: None,
            end_date: None,
        };
        let err = update_task(&h.state, &outsider, task.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(!h.repo.called("update_task"));
    }

    #[tokio::test]
    async fn head_of_another_department_cannot_delete() {
        let h = harness();
        let project = project_in_new_department(&h).await;
        let task = create_task(&h.state, &head_of(project.department_id), project.id, request(None))
            .await
            .unwrap();

        let err = delete_task(&h.state, &head_of(Uuid::new_v4()), task.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(!h.repo.called("delete_task"));

        delete_task(&h.state, &head_of(project.department_id), task.id).await.unwrap();
        assert!(h.repo.get_task(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn member_cannot_create_tasks() {
        let h = harness();
        let project = project_in_new_department(&h).await;
        let member = Actor::new("user_member", Role::Member).with_department(project.department_id);

        let err = create_task(&h.state, &member, project.id, request(None)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
