use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::task::Task;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(format = DateTime, example = "2025-05-01T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-07-31T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
    pub department_id: Uuid,
    /// Identity id of the creator; owner of the project's attachments.
    pub created_by: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub department_id: String,
    pub created_by: Option<String>,
    pub attachments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbProject> for Project {
    type Error = AppError;

    fn try_from(value: DbProject) -> Result<Self, Self::Error> {
        let attachments: Vec<String> = serde_json::from_str(&value.attachments)
            .map_err(|err| AppError::internal(format!("invalid attachments column: {err}")))?;

        Ok(Project {
            id: super::parse_uuid("projects.id", &value.id)?,
            name: value.name,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            department_id: super::parse_uuid("projects.department_id", &value.department_id)?,
            created_by: value.created_by,
            attachments,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectCreateRequest {
    #[schema(example = "Land Registry Digitisation")]
    pub name: String,
    #[schema(example = "Scan and index the archived land titles.")]
    pub description: Option<String>,
    #[schema(format = DateTime, example = "2025-05-01T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-07-31T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(format = DateTime, example = "2025-05-01T00:00:00Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(format = DateTime, example = "2025-08-15T00:00:00Z")]
    pub end_date: Option<DateTime<Utc>>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachmentRemoveRequest {
    #[schema(example = "https://storage.example.com/project-attachments/plan.pdf")]
    pub url: String,
}

/// The department page the deletion was issued from.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectDeleteQuery {
    pub department_id: Option<Uuid>,
}
