use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use swibi_database::{CreateItemRequest, Item, ItemRepository, UpdateItemRequest};
use utoipa::ToSchema;

use crate::error::FieldError;
use crate::{util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub item: Item,
}

const MIN_TITLE: usize = 3;
const MIN_DESCRIPTION: usize = 10;
const MIN_CITY: usize = 2;
const MIN_CATEGORY: usize = 2;

fn field_error(field: &str, message: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_text(details: &mut Vec<FieldError>, field: &str, value: &str, min: usize) {
    if value.trim().len() < min {
        details.push(field_error(
            field,
            format!("{field} must be at least {min} characters"),
        ));
    }
}

fn validate_create(request: &CreateItemRequest) -> Vec<FieldError> {
    let mut details = Vec::new();
    check_text(&mut details, "title", &request.title, MIN_TITLE);
    check_text(
        &mut details,
        "description",
        &request.description,
        MIN_DESCRIPTION,
    );
    if request.price < 0.0 || !request.price.is_finite() {
        details.push(field_error("price", "price must be a non-negative number"));
    }
    check_text(&mut details, "city", &request.city, MIN_CITY);
    check_text(&mut details, "category", &request.category, MIN_CATEGORY);
    if request.images.is_empty() {
        details.push(field_error("images", "at least one image is required"));
    }
    details
}

fn validate_update(request: &UpdateItemRequest) -> Vec<FieldError> {
    let mut details = Vec::new();
    if let Some(title) = &request.title {
        check_text(&mut details, "title", title, MIN_TITLE);
    }
    if let Some(description) = &request.description {
        check_text(&mut details, "description", description, MIN_DESCRIPTION);
    }
    if let Some(price) = request.price {
        if price < 0.0 || !price.is_finite() {
            details.push(field_error("price", "price must be a non-negative number"));
        }
    }
    if let Some(city) = &request.city {
        check_text(&mut details, "city", city, MIN_CITY);
    }
    if let Some(category) = &request.category {
        check_text(&mut details, "category", category, MIN_CATEGORY);
    }
    if let Some(images) = &request.images {
        if images.is_empty() {
            details.push(field_error("images", "at least one image is required"));
        }
    }
    details
}

#[utoipa::path(
    get,
    path = "/api/items/my-items",
    tag = "Items",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "The caller's items, soft-deleted ones excluded", body = ItemsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_my_items(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ItemsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ItemRepository::new(state.db_pool().clone());
    let items = repo.list_for_seller(user.id).await?;

    Ok(Json(ItemsResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Items",
    security(("bearerAuth" = [])),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid item payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let details = validate_create(&payload);
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let repo = ItemRepository::new(state.db_pool().clone());
    let item = repo.create(user.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(ItemResponse { item })))
}

#[utoipa::path(
    put,
    path = "/api/items/{item_id}",
    tag = "Items",
    security(("bearerAuth" = [])),
    params(("item_id" = String, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Invalid item payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found or not owned by caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let details = validate_update(&payload);
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let repo = ItemRepository::new(state.db_pool().clone());
    let item = repo.update(&item_id, user.id, &payload).await?;

    Ok(Json(ItemResponse { item }))
}

#[utoipa::path(
    delete,
    path = "/api/items/{item_id}",
    tag = "Items",
    security(("bearerAuth" = [])),
    params(("item_id" = String, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item soft-deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found or not owned by caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ItemRepository::new(state.db_pool().clone());
    repo.soft_delete(&item_id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/items/{item_id}/sell",
    tag = "Items",
    security(("bearerAuth" = [])),
    params(("item_id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item marked as sold", body = ItemResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found or not owned by caller", body = crate::error::ErrorResponse)
    )
)]
pub async fn sell_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let repo = ItemRepository::new(state.db_pool().clone());
    let item = repo.mark_sold(&item_id, user.id).await?;

    Ok(Json(ItemResponse { item }))
}
