use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Row in the `users` table mirroring an identity-provider account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identity-provider id, e.g. `user_2abc`.
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    #[schema(example = "member")]
    pub role: String,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub department_head: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithDepartment {
    #[serde(flatten)]
    pub user: User,
    pub department_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub position: Option<String>,
    pub department_id: Option<String>,
    pub department_head: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub department_name: Option<String>,
}

impl TryFrom<DbUser> for UserWithDepartment {
    type Error = AppError;

    fn try_from(value: DbUser) -> Result<Self, Self::Error> {
        let department_id = value
            .department_id
            .as_deref()
            .map(|id| super::parse_uuid("users.department_id", id))
            .transpose()?;

        Ok(UserWithDepartment {
            user: User {
                id: value.id,
                email: value.email,
                full_name: value.full_name,
                role: value.role,
                position: value.position,
                department_id,
                department_head: value.department_head,
                created_at: value.created_at,
                updated_at: value.updated_at,
            },
            department_name: value.department_name,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserUpdateRequest {
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
    #[schema(example = "member")]
    pub role: String,
    #[schema(example = "Surveyor")]
    pub position: Option<String>,
    /// Empty string unassigns the department.
    pub department_id: Option<String>,
    #[serde(default)]
    pub department_head: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    pub success: bool,
    pub created: usize,
}
