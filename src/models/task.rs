use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(AppError::internal(format!("invalid task status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Copied from the parent project when the task is created.
    pub department_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    #[schema(format = DateTime, example = "2025-05-02T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-05-09T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTask {
    pub id: String,
    pub project_id: String,
    pub department_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub assigned_to: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTask> for Task {
    type Error = AppError;

    fn try_from(value: DbTask) -> Result<Self, Self::Error> {
        Ok(Task {
            id: super::parse_uuid("tasks.id", &value.id)?,
            project_id: super::parse_uuid("tasks.project_id", &value.project_id)?,
            department_id: super::parse_uuid("tasks.department_id", &value.department_id)?,
            title: value.title,
            description: value.description,
            status: TaskStatus::parse(&value.status)?,
            assigned_to: value.assigned_to,
            start_date: value.start_date,
            end_date: value.end_date,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskWithProject {
    #[serde(flatten)]
    pub task: Task,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTaskWithProject {
    #[sqlx(flatten)]
    pub task: DbTask,
    pub project_name: Option<String>,
}

impl TryFrom<DbTaskWithProject> for TaskWithProject {
    type Error = AppError;

    fn try_from(value: DbTaskWithProject) -> Result<Self, Self::Error> {
        Ok(TaskWithProject {
            task: value.task.try_into()?,
            project_name: value.project_name,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskCreateRequest {
    #[schema(example = "Scan 1998 title deeds")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "pending")]
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    #[schema(format = DateTime, example = "2025-05-02T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-05-09T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
    /// Optional; must match the parent project's department when present.
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    #[schema(format = DateTime, example = "2025-05-02T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-05-12T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
}
