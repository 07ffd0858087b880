use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use swibi_database::{FeedItem, ItemRepository, Swipe, SwipeDirection, SwipeRepository};
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordSwipeRequest {
    pub item_id: String,
    pub direction: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SwipeResponse {
    pub swipe: Swipe,
}

#[utoipa::path(
    get,
    path = "/api/swipes/discover",
    tag = "Swipes",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Items the caller has not swiped yet", body = FeedResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn discover(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FeedResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let feed = state.feed();
    let repo = ItemRepository::new(state.db_pool().clone());
    let items = repo
        .discover(user.id, feed.page_size, feed.include_sold)
        .await?;

    Ok(Json(FeedResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/swipes",
    tag = "Swipes",
    security(("bearerAuth" = [])),
    request_body = RecordSwipeRequest,
    responses(
        (status = 201, description = "Swipe recorded", body = SwipeResponse),
        (status = 400, description = "Unknown swipe direction", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn record_swipe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RecordSwipeRequest>,
) -> Result<(StatusCode, Json<SwipeResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let direction = SwipeDirection::parse(&payload.direction)
        .ok_or_else(|| ApiError::bad_request("direction must be left or right"))?;

    let repo = SwipeRepository::new(state.db_pool().clone());
    let swipe = repo.record(user.id, &payload.item_id, direction).await?;

    Ok((StatusCode::CREATED, Json(SwipeResponse { swipe })))
}

#[utoipa::path(
    get,
    path = "/api/swipes/matches",
    tag = "Swipes",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Items the caller swiped right on", body = FeedResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn matches(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FeedResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = SwipeRepository::new(state.db_pool().clone());
    let items = repo.matches(user.id).await?;

    Ok(Json(FeedResponse { items }))
}
