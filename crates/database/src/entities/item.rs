//! Item entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Item {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    #[serde(skip_serializing)]
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub city: String,
    pub category: String,
    pub images: Vec<String>,
    pub status: ItemStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// An item as surfaced by the discovery feed and the matches list,
/// with the seller's public fields attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedItem {
    #[serde(flatten)]
    pub item: Item,
    pub seller: SellerSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerSummary {
    pub name: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub city: String,
    pub category: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemStatus {
    Active,
    Sold,
    Deleted,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Sold => "sold",
            ItemStatus::Deleted => "deleted",
        }
    }
}

impl From<&str> for ItemStatus {
    fn from(s: &str) -> Self {
        match s {
            "sold" => ItemStatus::Sold,
            "deleted" => ItemStatus::Deleted,
            _ => ItemStatus::Active,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
