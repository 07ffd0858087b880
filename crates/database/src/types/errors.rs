//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Item-specific database errors
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found")]
    ItemNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Swipe-specific database errors
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Item not found")]
    ItemNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Contact-specific database errors
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Contact not found")]
    ContactNotFound,

    #[error("Contact is no longer pending")]
    AlreadyResolved,

    #[error("Invalid contact status transition")]
    InvalidTransition,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Message-specific database errors
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Message content is required")]
    EmptyContent,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
