use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDepartment {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbDepartment> for Department {
    type Error = AppError;

    fn try_from(value: DbDepartment) -> Result<Self, Self::Error> {
        Ok(Department {
            id: super::parse_uuid("departments.id", &value.id)?,
            name: value.name,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentRequest {
    #[schema(example = "Estate Department")]
    pub name: String,
}
