//! Message entity definitions

use serde::Serialize;
use utoipa::ToSchema;

use super::contact::UserSummary;

/// A chat message joined with its sender's public profile, which is what
/// both the history listing and the send response return.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Message {
    #[serde(skip_serializing)]
    pub internal_id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    pub conversation_id: String,
    pub content: String,
    pub created_at: String,
    pub sender: UserSummary,
}
