use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    error::ErrorResponse,
    handler::{
        self,
        auth::{
            google::GoogleLoginRequest,
            password::{LoginRequest, RegisterRequest, RegisterResponse},
            LoginResponse,
        },
        broadcast::BroadcastInfoResponse,
        comments::{CommentResponse, CreateCommentRequest},
        health::Health,
        profile::UpdateNicknameRequest,
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::auth::password::register,
        handler::auth::password::login,
        handler::auth::password::restore,
        handler::auth::google::google_login,
        handler::profile::update_nickname,
        handler::profile::withdraw,
        handler::broadcast::list_regions,
        handler::broadcast::get_broadcast,
        handler::comments::list_comments,
        handler::comments::create_comment
    ),
    components(schemas(
        Health,
        ErrorResponse,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        GoogleLoginRequest,
        UpdateNicknameRequest,
        BroadcastInfoResponse,
        CommentResponse,
        CreateCommentRequest
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Sign-up, login and account restore"),
        (name = "profile", description = "Authenticated account operations"),
        (name = "tbn", description = "TBN regions and on-air programme"),
        (name = "comments", description = "Listener comments per region")
    )
)]
pub struct ApiDoc;
