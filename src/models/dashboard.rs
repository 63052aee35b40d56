use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub departments: i64,
    pub projects: i64,
    pub tasks: i64,
}
