//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{ContactError, DatabaseError, ItemError, MessageError, SwipeError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type ItemResult<T> = Result<T, ItemError>;
pub type SwipeResult<T> = Result<T, SwipeError>;
pub type ContactResult<T> = Result<T, ContactError>;
pub type MessageResult<T> = Result<T, MessageError>;
