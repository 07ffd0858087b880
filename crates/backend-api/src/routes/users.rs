use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use swibi_auth::UpdateUserProfile;
use utoipa::ToSchema;

use crate::error::FieldError;
use crate::routes::auth::UserResponse;
use crate::{util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UpdateUserProfileRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        check_min_len(&mut details, "name", self.name.as_deref(), 2);
        check_min_len(&mut details, "phone", self.phone.as_deref(), 8);
        check_min_len(&mut details, "city", self.city.as_deref(), 2);
        details
    }

    fn into_update(self) -> UpdateUserProfile {
        UpdateUserProfile {
            name: self.name,
            phone: self.phone,
            city: self.city,
            avatar_url: self.avatar_url,
        }
    }
}

fn check_min_len(details: &mut Vec<FieldError>, field: &str, value: Option<&str>, min: usize) {
    if let Some(value) = value {
        if value.trim().len() < min {
            details.push(FieldError {
                field: field.to_string(),
                message: format!("{field} must be at least {min} characters"),
            });
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(UserProfileResponse { user: user.into() }))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateUserProfileRequest,
    responses(
        (status = 200, description = "Updated user profile", body = UserProfileResponse),
        (status = 400, description = "Invalid profile payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserProfileRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let details = payload.validate();
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let updated = state
        .authenticator()
        .update_profile(user.id, payload.into_update())
        .await?;

    Ok(Json(UserProfileResponse {
        user: updated.into(),
    }))
}
