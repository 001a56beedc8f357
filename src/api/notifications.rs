//! `/api/notifications` handlers.

use super::{
    ApiError, AppState, Backend,
    extract::Authenticated,
    views::{Envelope, NotificationListPayload, NotificationPayload, NotificationView},
};
use crate::notification::domain::NotificationId;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiError>;

pub(super) async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Envelope<NotificationListPayload>>> {
    let notifications = state.notifications().inbox(&principal).await?;
    Ok(Json(Envelope::ok(NotificationListPayload {
        count: notifications.len(),
        notifications: notifications.iter().map(NotificationView::from).collect(),
    })))
}

pub(super) async fn mark_read<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<Envelope<NotificationPayload>>> {
    let id = Uuid::parse_str(&notification_id)
        .map(NotificationId::from_uuid)
        .map_err(|_| ApiError::not_found("Notification not found"))?;
    let notification = state.notifications().mark_read(&principal, id).await?;
    Ok(Json(Envelope::ok(NotificationPayload {
        notification: NotificationView::from(&notification),
    })))
}
