//! HTTP handlers for the notification relay.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{AppError, ErrorResponse, ValidatedJson};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

use crate::models::{
    CreateNotification, NewNotification, Notification, NotificationStatus, NotificationType, QueueSnapshot,
};
use crate::relay::NotificationRelay;

#[derive(OpenApi)]
#[openapi(
    paths(create_notification, queue_status),
    components(schemas(
        CreateNotification,
        Notification,
        NotificationType,
        NotificationStatus,
        QueueSnapshot,
        ErrorResponse,
    )),
    tags((name = "notifications", description = "Notification intake and queue inspection"))
)]
pub struct ApiDoc;

/// Routes for notification intake and queue inspection.
pub fn router(relay: Arc<NotificationRelay>) -> Router {
    Router::new()
        .route("/notifications", post(create_notification))
        .route("/queue", get(queue_status))
        .with_state(relay)
}

/// Accept a notification for asynchronous delivery
#[utoipa::path(
    post,
    path = "/notifications",
    tag = "notifications",
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification queued", body = Notification),
        (status = 400, description = "Malformed body or unknown notification type", body = ErrorResponse)
    )
)]
pub async fn create_notification(
    State(relay): State<Arc<NotificationRelay>>,
    ValidatedJson(payload): ValidatedJson<CreateNotification>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let request = NewNotification::try_from(payload)?;
    let notification = relay.enqueue(request).await;

    info!(
        notification_id = %notification.id,
        notification_type = %notification.notification_type,
        "Notification accepted"
    );

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Snapshot of the pending queue
#[utoipa::path(
    get,
    path = "/queue",
    tag = "notifications",
    responses(
        (status = 200, description = "Queued notifications, head first", body = QueueSnapshot)
    )
)]
pub async fn queue_status(State(relay): State<Arc<NotificationRelay>>) -> Json<QueueSnapshot> {
    Json(relay.status().await)
}
