//! Entity definitions for the SwiBi marketplace schema.

pub mod contact;
pub mod item;
pub mod message;
pub mod swipe;

pub use contact::{ContactDetail, ContactItem, ContactSeller, ContactStatus, ConversationRef, UserSummary};
pub use item::{CreateItemRequest, FeedItem, Item, ItemStatus, SellerSummary, UpdateItemRequest};
pub use message::Message;
pub use swipe::{Swipe, SwipeDirection};
