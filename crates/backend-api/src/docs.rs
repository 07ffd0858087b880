use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::items::list_my_items,
        crate::routes::items::create_item,
        crate::routes::items::update_item,
        crate::routes::items::delete_item,
        crate::routes::items::sell_item,
        crate::routes::swipes::discover,
        crate::routes::swipes::record_swipe,
        crate::routes::swipes::matches,
        crate::routes::contacts::list_contacts,
        crate::routes::contacts::get_contact,
        crate::routes::contacts::get_contact_by_conversation,
        crate::routes::contacts::update_contact_status,
        crate::routes::messages::get_messages,
        crate::routes::messages::send_message
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::FieldError,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::users::UserProfileResponse,
            crate::routes::users::UpdateUserProfileRequest,
            crate::routes::items::ItemsResponse,
            crate::routes::items::ItemResponse,
            crate::routes::swipes::FeedResponse,
            crate::routes::swipes::RecordSwipeRequest,
            crate::routes::swipes::SwipeResponse,
            crate::routes::contacts::ContactsResponse,
            crate::routes::contacts::ContactResponse,
            crate::routes::contacts::UpdateContactStatusRequest,
            crate::routes::messages::MessagesResponse,
            crate::routes::messages::MessageResponse,
            crate::routes::messages::SendMessageRequest,
            swibi_database::Item,
            swibi_database::ItemStatus,
            swibi_database::FeedItem,
            swibi_database::SellerSummary,
            swibi_database::CreateItemRequest,
            swibi_database::UpdateItemRequest,
            swibi_database::Swipe,
            swibi_database::SwipeDirection,
            swibi_database::ContactDetail,
            swibi_database::ContactItem,
            swibi_database::ContactSeller,
            swibi_database::ContactStatus,
            swibi_database::ConversationRef,
            swibi_database::UserSummary,
            swibi_database::Message
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration and session management"),
        (name = "Users", description = "User profile management"),
        (name = "Items", description = "The caller's item catalog"),
        (name = "Swipes", description = "Discovery feed and swipe recording"),
        (name = "Contacts", description = "Contact lifecycle between buyer and seller"),
        (name = "Messages", description = "Polled conversation messaging")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
