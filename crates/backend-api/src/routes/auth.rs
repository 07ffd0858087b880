use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use swibi_auth::{AuthSession, User};
use utoipa::ToSchema;

use crate::error::FieldError;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            user: user.into(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            name: value.name,
            phone: value.phone,
            city: value.city,
            avatar_url: value.avatar_url,
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Vec<FieldError> {
    let mut details = Vec::new();
    if !email.contains('@') {
        details.push(FieldError {
            field: "email".to_string(),
            message: "A valid email address is required".to_string(),
        });
    }
    if password.is_empty() {
        details.push(FieldError {
            field: "password".to_string(),
            message: "Password is required".to_string(),
        });
    }
    details
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = SessionResponse),
        (status = 400, description = "Invalid payload or email already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let details = validate_credentials(&payload.email, &payload.password);
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let (user, session) = state
        .authenticator()
        .register_with_password(&payload.email, &payload.password, payload.name.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::new(session, user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = SessionResponse),
        (status = 401, description = "Unknown email or wrong password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let details = validate_credentials(&payload.email, &payload.password);
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let (user, session) = state
        .authenticator()
        .login_with_password(&payload.email, &payload.password)
        .await?;

    Ok(Json(SessionResponse::new(session, user)))
}
