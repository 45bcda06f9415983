//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API. It
//! registers every HTTP endpoint from the inbound layer, the error payload
//! schemas, and the token cookie security scheme. Debug builds serve the
//! generated document at `/api-docs/openapi.json`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the token cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Session token cookie issued by POST /jwt.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Volunteer marketplace API",
        description = "Session-authenticated record management for volunteer posts and requests."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenCookie" = [])),
    paths(
        crate::inbound::http::auth::issue_token,
        crate::inbound::http::auth::logout,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::increment_volunteers,
        crate::inbound::http::posts::decrement_volunteers,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::requests::update_request_status,
        crate::inbound::http::requests::delete_request,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::inbound::http::auth::TokenRequest,
        crate::inbound::http::requests::StatusUpdate,
    )),
    tags(
        (name = "auth", description = "Session issuance and teardown"),
        (name = "posts", description = "Volunteer post records"),
        (name = "requests", description = "Volunteering request records"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_family() {
        let doc = ApiDoc::openapi();
        for path in [
            "/jwt",
            "/logout",
            "/all-volunteer-post",
            "/all-volunteer-post/{id}",
            "/all-volunteer-post/increment/{id}",
            "/all-volunteer-post/decrement/{id}",
            "/requests",
            "/requests/{id}",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path: {path}");
        }
    }

    #[test]
    fn document_registers_the_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("TokenCookie"));
    }
}
