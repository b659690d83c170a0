//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] lists every page handler and the health checks together with
//! the schemas they reference. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Post, ViewName};
use crate::inbound::http::pages::{PostRequest, SignInRequest, SignUpRequest};
use crate::inbound::http::schemas::RenderedViewSchema;

/// Registers the session cookie as the security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by /signUp and /signIn.",
            ))),
        );
    }
}

/// OpenAPI document for the page surface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "murmur",
        description = "Pages of a micro-blogging service rendered as named views.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::pages::home,
        crate::inbound::http::pages::sign_up,
        crate::inbound::http::pages::sign_up_query,
        crate::inbound::http::pages::sign_in_form,
        crate::inbound::http::pages::sign_in,
        crate::inbound::http::pages::profile,
        crate::inbound::http::pages::post_message,
        crate::inbound::http::pages::follow,
        crate::inbound::http::pages::stop_following,
        crate::inbound::http::pages::mentions,
        crate::inbound::http::pages::timeline,
        crate::inbound::http::pages::logout,
        crate::inbound::http::pages::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RenderedViewSchema,
        ViewName,
        Post,
        Error,
        ErrorCode,
        SignUpRequest,
        SignInRequest,
        PostRequest,
    )),
    tags(
        (name = "pages", description = "Routes rendered as views or redirects"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
