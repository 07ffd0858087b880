mod docs;
mod error;
mod state;
mod util;

pub mod routes;

pub use docs::ApiDoc;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        // Profile routes
        .route("/api/users/profile", get(routes::users::get_profile))
        .route("/api/users/profile", put(routes::users::update_profile))
        // Item routes
        .route("/api/items/my-items", get(routes::items::list_my_items))
        .route("/api/items", post(routes::items::create_item))
        .route("/api/items/:item_id", put(routes::items::update_item))
        .route("/api/items/:item_id", delete(routes::items::delete_item))
        .route("/api/items/:item_id/sell", patch(routes::items::sell_item))
        // Swipe routes
        .route("/api/swipes/discover", get(routes::swipes::discover))
        .route("/api/swipes", post(routes::swipes::record_swipe))
        .route("/api/swipes/matches", get(routes::swipes::matches))
        // Contact routes
        .route("/api/contacts", get(routes::contacts::list_contacts))
        .route(
            "/api/contacts/conversation/:conversation_id",
            get(routes::contacts::get_contact_by_conversation),
        )
        .route(
            "/api/contacts/:contact_id",
            get(routes::contacts::get_contact),
        )
        .route(
            "/api/contacts/:contact_id/status",
            patch(routes::contacts::update_contact_status),
        )
        // Message routes
        .route(
            "/api/messages/:conversation_id",
            get(routes::messages::get_messages),
        )
        .route(
            "/api/messages/:conversation_id",
            post(routes::messages::send_message),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
