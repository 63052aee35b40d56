pub mod dashboard;
pub mod department;
pub mod project;
pub mod task;
pub mod user;

use uuid::Uuid;

use crate::errors::AppError;

/// Parses a UUID stored as text, reporting the offending column on failure.
pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value).map_err(|err| AppError::internal(format!("invalid uuid in {column}: {err}")))
}
