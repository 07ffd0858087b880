//! Contact entity definitions
//!
//! A contact is the pending link a right swipe opens between a buyer and the
//! item's seller. The seller is never stored on the contact row; it is always
//! derived through the item.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Accepted => "accepted",
            ContactStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" | "pending" => Some(ContactStatus::Pending),
            "ACCEPTED" | "accepted" => Some(ContactStatus::Accepted),
            "REJECTED" | "rejected" => Some(ContactStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public profile fields exposed to the other party of a contact.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversationRef {
    pub id: String,
}

/// A contact joined with everything the contact list and detail views need:
/// the buyer's public profile, the item with its seller attached, and the
/// conversation id once one exists.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactDetail {
    pub id: String,
    pub status: ContactStatus,
    pub created_at: String,
    pub user: UserSummary,
    pub item: ContactItem,
    pub conversation: Option<ConversationRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactItem {
    #[serde(flatten)]
    pub item: Item,
    pub seller: ContactSeller,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactSeller {
    pub id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}
