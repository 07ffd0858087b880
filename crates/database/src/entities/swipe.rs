//! Swipe entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-only record of a user's reaction to an item in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Swipe {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub item_id: String,
    pub direction: SwipeDirection,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(SwipeDirection::Left),
            "right" => Some(SwipeDirection::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_known_directions() {
        assert_eq!(SwipeDirection::parse("left"), Some(SwipeDirection::Left));
        assert_eq!(SwipeDirection::parse("right"), Some(SwipeDirection::Right));
        assert_eq!(SwipeDirection::parse("up"), None);
        assert_eq!(SwipeDirection::parse(""), None);
    }
}
