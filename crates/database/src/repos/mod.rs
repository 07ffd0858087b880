//! Repository implementations for data access.

pub mod contact_repository;
pub mod item_repository;
pub mod message_repository;
pub mod swipe_repository;

#[cfg(test)]
pub(crate) mod test_support;

pub use contact_repository::ContactRepository;
pub use item_repository::ItemRepository;
pub use message_repository::MessageRepository;
pub use swipe_repository::SwipeRepository;
