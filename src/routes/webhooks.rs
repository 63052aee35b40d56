use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::identity::Identity;
use crate::services;
use crate::utils::utc_now;
use crate::webhook::{DeletedObject, WebhookEvent};

#[utoipa::path(
    post,
    path = "/api/webhooks/identity",
    tag = "Webhooks",
    request_body(content = String, description = "Signed identity-provider event", content_type = "application/json"),
    responses(
        (status = 201, description = "User mirrored"),
        (status = 200, description = "Event processed or ignored"),
        (status = 400, description = "Missing or invalid signature, or malformed payload"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    state.webhook.verify(&headers, &body, utc_now())?;

    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|err| AppError::bad_request(format!("malformed event: {err}")))?;
    tracing::info!(event_type = %event.event_type, "identity webhook received");

    match event.event_type.as_str() {
        "user.created" => {
            let identity: Identity = serde_json::from_value(event.data)
                .map_err(|err| AppError::bad_request(format!("malformed user payload: {err}")))?;
            services::users::mirror_created_identity(&state, &identity).await?;
            Ok(StatusCode::CREATED)
        }
        "user.deleted" => {
            let deleted: DeletedObject = serde_json::from_value(event.data)
                .map_err(|err| AppError::bad_request(format!("malformed user payload: {err}")))?;
            let id = deleted.id.unwrap_or_default();
            services::users::remove_deleted_identity(&state, &id).await?;
            Ok(StatusCode::OK)
        }
        _ => Ok(StatusCode::OK),
    }
}
