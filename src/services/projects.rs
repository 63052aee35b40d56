use std::collections::HashMap;

use uuid::Uuid;

use super::authorize;
use crate::app::AppState;
use crate::authz::{require_approved, Actor, Permission, ResourceContext};
use crate::errors::{AppError, AppResult};
use crate::models::project::{Project, ProjectCreateRequest, ProjectUpdateRequest, ProjectWithTasks};
use crate::models::task::Task;
use crate::utils::{non_blank, require_non_blank, utc_now, validate_date_range};

fn clean_attachments(attachments: Vec<String>) -> AppResult<Vec<String>> {
    attachments
        .iter()
        .map(|url| require_non_blank("attachment url", url))
        .collect()
}

async fn find_project(state: &AppState, id: Uuid) -> AppResult<Project> {
    state
        .repo
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::not_found("project not found"))
}

/// Projects of a department, newest first, each with its tasks.
pub async fn list_projects(state: &AppState, actor: &Actor, department_id: Uuid) -> AppResult<Vec<ProjectWithTasks>> {
    require_approved(actor)?;

    if state.repo.get_department(department_id).await?.is_none() {
        return Err(AppError::not_found("department not found"));
    }

    let (projects, tasks) = tokio::try_join!(
        state.repo.list_projects(department_id),
        state.repo.list_tasks_for_department(department_id),
    )?;

    let mut by_project: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_project.entry(task.project_id).or_default().push(task);
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let tasks = by_project.remove(&project.id).unwrap_or_default();
            ProjectWithTasks { project, tasks }
        })
        .collect())
}

pub async fn get_project(state: &AppState, actor: &Actor, id: Uuid) -> AppResult<ProjectWithTasks> {
    require_approved(actor)?;

    let (project, tasks) = tokio::try_join!(find_project(state, id), state.repo.list_tasks_for_project(id))?;
    Ok(ProjectWithTasks { project, tasks })
}

pub async fn create_project(
    state: &AppState,
    actor: &Actor,
    department_id: Uuid,
    request: ProjectCreateRequest,
) -> AppResult<Project> {
    let name = require_non_blank("name", &request.name)?;
    validate_date_range(request.start_date, request.end_date)?;
    let attachments = clean_attachments(request.attachments)?;

    authorize(
        state,
        actor,
        Permission::CreateProject,
        &ResourceContext::new().with_department(department_id),
    )?;

    if state.repo.get_department(department_id).await?.is_none() {
        return Err(AppError::not_found("department not found"));
    }

    let now = utc_now();
    let project = Project {
        id: Uuid::new_v4(),
        name,
        description: non_blank(request.description.as_deref()).map(str::to_string),
        start_date: request.start_date,
        end_date: request.end_date,
        department_id,
        created_by: actor.id.clone(),
        attachments,
        created_at: now,
        updated_at: now,
    };
    state.repo.insert_project(&project).await?;

    tracing::info!(project_id = %project.id, department_id = %department_id, "project created");
    Ok(project)
}

/// The department is fixed at creation; it is not part of the update.
pub async fn update_project(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    request: ProjectUpdateRequest,
) -> AppResult<Project> {
    let name = request
        .name
        .as_deref()
        .map(|name| require_non_blank("name", name))
        .transpose()?;
    let attachments = request.attachments.map(clean_attachments).transpose()?;

    let mut project = find_project(state, id).await?;
    authorize(
        state,
        actor,
        Permission::EditProject,
        &ResourceContext::new().with_department(project.department_id),
    )?;

    if let Some(name) = name {
        project.name = name;
    }
    if let Some(description) = request.description {
        project.description = non_blank(Some(description.as_str())).map(str::to_string);
    }
    if request.start_date.is_some() {
        project.start_date = request.start_date;
    }
    if request.end_date.is_some() {
        project.end_date = request.end_date;
    }
    if let Some(attachments) = attachments {
        project.attachments = attachments;
    }
    validate_date_range(project.start_date, project.end_date)?;
    project.updated_at = utc_now();

    if !state.repo.update_project(&project).await? {
        return Err(AppError::not_found("project not found"));
    }
    Ok(project)
}

/// `current_department_id` is the department the deletion was issued from;
/// without it the project's own department is assumed.
pub async fn delete_project(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    current_department_id: Option<Uuid>,
) -> AppResult<()> {
    let project = find_project(state, id).await?;

    let ctx = ResourceContext::new()
        .with_department(project.department_id)
        .with_current_department(current_department_id.unwrap_or(project.department_id));
    authorize(state, actor, Permission::DeleteProject, &ctx)?;

    if !state.repo.delete_project(id).await? {
        return Err(AppError::not_found("project not found"));
    }

    tracing::info!(project_id = %id, "project deleted");
    Ok(())
}

pub async fn remove_attachment(state: &AppState, actor: &Actor, id: Uuid, url: &str) -> AppResult<Project> {
    let url = require_non_blank("url", url)?;

    let mut project = find_project(state, id).await?;
    authorize(
        state,
        actor,
        Permission::DeleteAttachment,
        &ResourceContext::new().with_owner(project.created_by.clone()),
    )?;

    let before = project.attachments.len();
    project.attachments.retain(|attachment| *attachment != url);
    if project.attachments.len() == before {
        return Err(AppError::not_found("attachment not found on this project"));
    }
    project.updated_at = utc_now();

    if !state.repo.update_project(&project).await? {
        return Err(AppError::not_found("project not found"));
    }
    Ok(project)
}
