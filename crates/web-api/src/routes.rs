use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

use application::{
    CreateChatRequest, CreateNotificationRequest, DeleteChatRequest, SendMessageRequest,
};
use domain::{
    Attachment, Chat, ChatId, ChatMessage, Notification, NotificationId, UserId,
    MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH,
};

use crate::{error::ApiError, state::AppState, ws_connection::WebSocketConnection};

// validator 的长度上限是 u64，实体里的字符数检查仍以 domain 常量为准
const MESSAGE_LENGTH_LIMIT: u64 = MAX_MESSAGE_LENGTH as u64;
const TITLE_LENGTH_LIMIT: u64 = MAX_TITLE_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
struct CreateChatPayload {
    #[validate(length(min = 1))]
    initiator_id: String,
    #[validate(length(min = 1))]
    recipient_id: String,
}

#[derive(Debug, Deserialize, Validate)]
struct AttachmentPayload {
    #[validate(length(min = 1))]
    url: String,
    file_name: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct SendMessagePayload {
    #[validate(length(min = 1))]
    sender_id: String,
    #[serde(default)]
    #[validate(length(max = MESSAGE_LENGTH_LIMIT))]
    message: String,
    #[serde(default)]
    #[validate(nested)]
    attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Deserialize, Validate)]
struct CreateNotificationPayload {
    #[validate(length(min = 1))]
    user_id: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    notification_type: String,
    #[validate(length(min = 1, max = TITLE_LENGTH_LIMIT))]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct PresenceResponse {
    user_id: UserId,
    online: bool,
}

#[derive(Debug, Serialize)]
struct OnlineCountResponse {
    online_users: usize,
}

#[derive(Debug, Serialize)]
struct UnreadCountResponse {
    unread: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(websocket_upgrade))
        .route("/presence", get(online_count))
        .route("/presence/{user_id}", get(presence_of))
        .route("/chats", post(create_chat))
        .route("/chats/{chat_id}", delete(delete_chat))
        .route(
            "/chats/{chat_id}/messages",
            post(send_message).get(list_messages),
        )
        .route("/users/{user_id}/chats", get(list_chats))
        .route("/users/{user_id}/notifications", get(list_notifications))
        .route(
            "/users/{user_id}/notifications/unread-count",
            get(unread_count),
        )
        .route("/notifications", post(create_notification))
        .route("/notifications/{notification_id}", delete(delete_notification))
        .route("/notifications/{notification_id}/read", patch(mark_read))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 查询参数和路径里的用户ID不能是空值或占位符
fn parse_user_id(raw: String) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|err| ApiError::bad_request(err.to_string()))
}

async fn websocket_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| WebSocketConnection::new(state).run(socket))
}

async fn presence_of(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<PresenceResponse> {
    let user_id = UserId::new(user_id);
    let online = state.registry.is_online(&user_id).await;
    Json(PresenceResponse { user_id, online })
}

async fn online_count(State(state): State<AppState>) -> Json<OnlineCountResponse> {
    Json(OnlineCountResponse {
        online_users: state.registry.len().await,
    })
}

async fn create_chat(
    State(state): State<AppState>,
    Json(payload): Json<CreateChatPayload>,
) -> Result<(StatusCode, Json<Chat>), ApiError> {
    payload.validate()?;

    let chat = state
        .chat_service
        .create_chat(CreateChatRequest {
            initiator_id: UserId::new(payload.initiator_id),
            recipient_id: UserId::new(payload.recipient_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

async fn list_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Chat>>, ApiError> {
    let user_id = parse_user_id(user_id)?;
    let chats = state.chat_service.list_chats(&user_id).await?;
    Ok(Json(chats))
}

async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    let operator_id = parse_user_id(query.user_id)?;

    state
        .chat_service
        .delete_chat(DeleteChatRequest {
            chat_id: ChatId::from(chat_id),
            operator_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    payload.validate()?;

    let attachments = payload
        .attachments
        .into_iter()
        .map(|a| Attachment {
            url: a.url,
            file_name: a.file_name,
            mime_type: a.mime_type,
        })
        .collect();

    let message = state
        .chat_service
        .send_message(SendMessageRequest {
            chat_id: ChatId::from(chat_id),
            sender_id: parse_user_id(payload.sender_id)?,
            message: payload.message,
            attachments,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let user_id = parse_user_id(query.user_id)?;
    let messages = state
        .chat_service
        .list_messages(ChatId::from(chat_id), &user_id)
        .await?;
    Ok(Json(messages))
}

async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationPayload>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    payload.validate()?;

    let notification = state
        .notification_service
        .create_notification(CreateNotificationRequest {
            user_id: parse_user_id(payload.user_id)?,
            notification_type: payload.notification_type,
            title: payload.title,
            description: payload.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let user_id = parse_user_id(user_id)?;
    let notifications = state.notification_service.list_for_user(&user_id).await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let user_id = parse_user_id(user_id)?;
    let unread = state.notification_service.unread_count(&user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let notification = state
        .notification_service
        .mark_read(NotificationId::from(notification_id))
        .await?;
    Ok(Json(notification))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .notification_service
        .delete_notification(NotificationId::from(notification_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
