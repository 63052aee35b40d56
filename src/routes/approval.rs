use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::approval::ApprovalStatus;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::utils::utc_now;

/// Approval is read from the user mirror, so an account the webhook has not
/// mirrored yet reports as pending.
#[utoipa::path(
    get,
    path = "/api/approval-status",
    tag = "Approval",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current approval status", body = ApprovalStatus),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Status lookup failed")
    )
)]
pub async fn approval_status(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<ApprovalStatus>> {
    let now = utc_now();
    let status = match state.repo.get_user(&auth.identity_id).await? {
        Some(record) => ApprovalStatus::from_user(&record, now),
        None => ApprovalStatus::pending(now),
    };

    Ok(Json(status))
}
