use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use swibi_database::{ContactDetail, ContactRepository, ContactStatus};
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

/// Contacts split by the caller's role: `sent` are the ones they opened by
/// swiping right, `received` are the ones opened on their items.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactsResponse {
    pub sent: Vec<ContactDetail>,
    pub received: Vec<ContactDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub contact: ContactDetail,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactStatusRequest {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "The caller's sent and received contacts", body = ContactsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ContactsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ContactRepository::new(state.db_pool().clone());
    let sent = repo.list_sent(user.id).await?;
    let received = repo.list_received(user.id).await?;

    Ok(Json(ContactsResponse { sent, received }))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("contact_id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact detail", body = ContactResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found or not visible to caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ContactRepository::new(state.db_pool().clone());
    let contact = repo
        .find_visible(&contact_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    Ok(Json(ContactResponse { contact }))
}

#[utoipa::path(
    get,
    path = "/api/contacts/conversation/{conversation_id}",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("conversation_id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Contact behind the conversation", body = ContactResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found or not visible to caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_contact_by_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ContactRepository::new(state.db_pool().clone());
    let contact = repo
        .find_by_conversation(&conversation_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    Ok(Json(ContactResponse { contact }))
}

#[utoipa::path(
    patch,
    path = "/api/contacts/{contact_id}/status",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("contact_id" = String, Path, description = "Contact id")),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Contact transitioned", body = ContactResponse),
        (status = 400, description = "Unknown or illegal target status", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found or caller is not the seller", body = crate::error::ErrorResponse),
        (status = 409, description = "Contact already resolved", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_contact_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
    Json(payload): Json<UpdateContactStatusRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let target = ContactStatus::parse(&payload.status)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let repo = ContactRepository::new(state.db_pool().clone());
    let contact = repo.transition(&contact_id, user.id, target).await?;

    Ok(Json(ContactResponse { contact }))
}
