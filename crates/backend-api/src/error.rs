use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use swibi_auth::AuthError;
use swibi_database::{ContactError, ItemError, MessageError, SwipeError};
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

/// One field-level validation failure, keyed by the offending field.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<FieldError>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn validation(details: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid input".to_string(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::UserExists | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!(error = %error, "auth backend error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Server error".to_string()
        } else {
            error.to_string()
        };

        Self::new(status, message)
    }
}

impl From<ItemError> for ApiError {
    fn from(error: ItemError) -> Self {
        match error {
            ItemError::ItemNotFound => Self::not_found("Item not found"),
            ItemError::DatabaseError(detail) => {
                error!(detail, "item query failed");
                Self::internal_server_error("Server error")
            }
        }
    }
}

impl From<SwipeError> for ApiError {
    fn from(error: SwipeError) -> Self {
        match error {
            SwipeError::ItemNotFound => Self::not_found("Item not found"),
            SwipeError::DatabaseError(detail) => {
                error!(detail, "swipe query failed");
                Self::internal_server_error("Server error")
            }
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(error: ContactError) -> Self {
        match error {
            ContactError::ContactNotFound => Self::not_found("Contact not found"),
            ContactError::AlreadyResolved => Self::conflict("Contact is no longer pending"),
            ContactError::InvalidTransition => Self::bad_request("Invalid status"),
            ContactError::DatabaseError(detail) => {
                error!(detail, "contact query failed");
                Self::internal_server_error("Server error")
            }
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(error: MessageError) -> Self {
        match error {
            MessageError::ConversationNotFound => Self::not_found("Conversation not found"),
            MessageError::EmptyContent => Self::bad_request("Message content is required"),
            MessageError::DatabaseError(detail) => {
                error!(detail, "message query failed");
                Self::internal_server_error("Server error")
            }
        }
    }
}
