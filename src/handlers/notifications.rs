use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::inbox::{InboxNotification, InboxQuery, NewInboxNotification};
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::AuthUser;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InboxParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    #[serde(default)]
    pub notification_ids: Vec<Uuid>,
    #[serde(default = "default_read")]
    pub read: bool,
}

fn default_read() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNotificationsRequest {
    #[serde(default)]
    pub notification_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(InboxParams),
    responses(
        (status = 200, description = "One page of the caller's notifications", body = [InboxNotification]),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    params: web::Query<InboxParams>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let query = InboxQuery {
        limit: params.limit,
        offset: params.offset,
        unread_only: params.unread_only,
    };
    let (page, query) = web::block(move || state.inbox.list(caller.id, query))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let has_more = page.has_more(&query);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "notifications": page.items,
        "total": page.total,
        "hasMore": has_more
    })))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification stored", body = InboxNotification),
        (status = 400, description = "Title or message missing"),
    ),
    tag = "notifications"
)]
pub async fn create_notification(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<CreateNotificationRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NewInboxNotification {
        title: body.title,
        message: body.message,
        kind: body.kind,
        reference_id: body.reference_id,
        reference_type: body.reference_type,
    };
    let notification = web::block(move || state.inbox.create(caller.id, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "notification": notification })))
}

/// PUT /api/notifications
///
/// Marks the listed notifications read or unread. Ids the caller does not
/// own are skipped.
#[utoipa::path(
    put,
    path = "/api/notifications",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Flags updated"),
        (status = 400, description = "Invalid notification IDs"),
    ),
    tag = "notifications"
)]
pub async fn mark_notifications(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<MarkReadRequest>,
) -> Result<HttpResponse, AppError> {
    let MarkReadRequest { notification_ids, read } = body.into_inner();
    let changed = web::block(move || state.inbox.set_read(caller.id, &notification_ids, read))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let flag = if read { "read" } else { "unread" };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Marked {} notifications as {}", changed, flag)
    })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/mark-all-read",
    responses((status = 200, description = "Every notification read")),
    tag = "notifications"
)]
pub async fn mark_all_read(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    let changed = web::block(move || state.inbox.mark_all_read(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Marked {} notifications as read", changed)
    })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications",
    request_body = DeleteNotificationsRequest,
    responses(
        (status = 200, description = "Notifications deleted"),
        (status = 400, description = "Invalid notification IDs"),
    ),
    tag = "notifications"
)]
pub async fn delete_notifications(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<DeleteNotificationsRequest>,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().notification_ids;
    let deleted = web::block(move || state.inbox.delete(caller.id, &ids))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Deleted {} notifications", deleted)
    })))
}
