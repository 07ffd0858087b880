use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use swibi_database::{Message, MessageRepository};
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: Message,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/messages/{conversation_id}",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(("conversation_id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Full message history, oldest first", body = MessagesResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found or not visible to caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = MessageRepository::new(state.db_pool().clone());
    let messages = repo.list(&conversation_id, user.id).await?;

    Ok(Json(MessagesResponse { messages }))
}

#[utoipa::path(
    post,
    path = "/api/messages/{conversation_id}",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(("conversation_id" = String, Path, description = "Conversation id")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Empty message content", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found or not visible to caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = MessageRepository::new(state.db_pool().clone());
    let message = repo
        .append(&conversation_id, user.id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}
