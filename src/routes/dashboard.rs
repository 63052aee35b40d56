use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::CurrentActor;
use crate::models::dashboard::DashboardCounts;
use crate::services;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Record tallies", body = DashboardCounts))
)]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<DashboardCounts>> {
    Ok(Json(services::dashboard::counts(&state, &actor).await?))
}
