/// Notification endpoints
///
/// - `GET /api/notifications` - The caller's 50 newest notifications
/// - `PUT /api/notifications/:id/read` - Mark one as read
/// - `PUT /api/notifications/read-all` - Mark all as read
///
/// There is no push channel. The list response carries an
/// `X-Poll-Interval` header (seconds) telling clients how often to poll.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    routes::views::MessageResponse,
};
use axum::{
    extract::State,
    Extension, Json,
};
use projecthub_shared::{auth::middleware::AuthContext, models::notification::Notification};
use uuid::Uuid;

pub const POLL_INTERVAL_HEADER: &str = "x-poll-interval";

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<([(&'static str, String); 1], Json<Vec<Notification>>)> {
    let notifications = Notification::list_recent(&state.db, auth.user_id).await?;
    let interval = state.config.notifications.poll_interval_secs.to_string();

    Ok(([(POLL_INTERVAL_HEADER, interval)], Json(notifications)))
}

/// # Errors
///
/// - `404`: No such notification, or it belongs to someone else
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = Notification::mark_read(&state.db, notification_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let updated = Notification::mark_all_read(&state.db, auth.user_id).await?;
    tracing::debug!(user_id = %auth.user_id, updated, "Marked notifications read");

    Ok(Json(MessageResponse {
        message: "All notifications marked as read".to_string(),
    }))
}
