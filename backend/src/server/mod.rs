//! Server construction and middleware wiring.

mod config;

pub use config::{server_config_from_env, BuildMode, ConfigError, RuntimeMode, ServerConfig};

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::TokenCodec;
use crate::inbound::http::auth::{issue_token, logout, CookiePolicy};
use crate::inbound::http::health::{banner, live, ready, HealthState};
use crate::inbound::http::posts::{
    create_post, decrement_volunteers, delete_post, get_post, increment_volunteers, list_posts,
    update_post,
};
use crate::inbound::http::requests::{
    create_request, delete_request, list_requests, update_request_status,
};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::MemoryStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;

/// Shared handles every worker's app instance clones.
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Document store handle for the resource handlers.
    pub http_state: web::Data<HttpState>,
    /// Token signer and verifier.
    pub codec: web::Data<TokenCodec>,
    /// Cookie attributes for the deployment environment.
    pub cookie_policy: web::Data<CookiePolicy>,
    /// Origins granted credentialed cross-origin access.
    pub allowed_origins: Vec<String>,
}

fn build_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .supports_credentials()
        .allowed_methods(["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600);
    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Assemble the application with middleware and every route registered.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        codec,
        cookie_policy,
        allowed_origins,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(codec)
        .app_data(cookie_policy)
        .wrap(build_cors(&allowed_origins))
        .wrap(Trace)
        .service(banner)
        .service(ready)
        .service(live)
        .service(issue_token)
        .service(logout)
        .service(list_posts)
        .service(create_post)
        .service(increment_volunteers)
        .service(decrement_volunteers)
        .service(get_post)
        .service(update_post)
        .service(delete_post)
        .service(create_request)
        .service(list_requests)
        .service(update_request_status)
        .service(delete_request);

    #[cfg(debug_assertions)]
    let app = app.route(
        "/api-docs/openapi.json",
        web::get().to(|| async { web::Json(ApiDoc::openapi()) }),
    );
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(Arc::new(MemoryStore::new())));
    let codec = web::Data::new(TokenCodec::from_secret(&config.secret));
    let cookie_policy = web::Data::new(match config.runtime_mode {
        RuntimeMode::Development => CookiePolicy::development(),
        RuntimeMode::Production => CookiePolicy::production(),
    });
    let allowed_origins = config.allowed_origins.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            codec: codec.clone(),
            cookie_policy: cookie_policy.clone(),
            allowed_origins: allowed_origins.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
