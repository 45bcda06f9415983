//! Identity guard for HTTP handlers.
//!
//! [`SessionIdentity`] is an extractor: declaring it as a handler parameter
//! gates the route behind a verified session token. Routes without the
//! parameter stay public.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::{debug, warn};

use crate::domain::{Error, Identity, TokenCodec};

/// Cookie slot carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

fn not_authorized() -> Error {
    Error::unauthorized("Not Authorized")
}

/// Resolve the caller's identity from the request's token cookie.
///
/// Used directly by routes that apply the guard conditionally (a public
/// listing that only needs authentication when an ownership filter is
/// present).
///
/// # Errors
/// [`Error::unauthorized`] when the cookie is absent or the token fails
/// verification; the internal failure kind is logged, the response body is
/// the same 401 either way.
pub fn resolve(req: &HttpRequest) -> Result<Identity, Error> {
    let codec = req
        .app_data::<web::Data<TokenCodec>>()
        .ok_or_else(|| Error::internal("token codec is not configured"))?;
    let cookie = req.cookie(TOKEN_COOKIE).ok_or_else(|| {
        debug!("session cookie absent");
        not_authorized()
    })?;
    codec.verify(cookie.value()).map_err(|err| {
        warn!(kind = err.kind(), "session token rejected");
        not_authorized()
    })
}

/// Verified caller identity bound to the request.
#[derive(Debug, Clone)]
pub struct SessionIdentity(Identity);

impl SessionIdentity {
    #[cfg(test)]
    pub(crate) fn for_tests(identity: Identity) -> Self {
        Self(identity)
    }

    /// Email the session was issued for.
    #[must_use]
    pub fn email(&self) -> &str {
        self.0.email()
    }

    /// Borrow the underlying identity claim.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Evaluate the ownership policy against a claimed identity.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] when the claimed identity does not match.
    pub fn require_match(&self, claimed: &str) -> Result<(), Error> {
        self.0.require_match(claimed)
    }
}

impl FromRequest for SessionIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(SessionIdentity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};
    use chrono::Duration;
    use mockable::MockClock;
    use serde_json::Value;
    use std::sync::Arc;

    const SECRET: &[u8] = b"guard-test-secret-guard-test-secret!";

    fn codec_at(at: chrono::DateTime<chrono::Utc>) -> TokenCodec {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(move || at);
        TokenCodec::new(SECRET, Arc::new(clock))
    }

    fn guarded_app(
        codec: TokenCodec,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(codec)).route(
            "/guarded",
            web::get().to(|identity: SessionIdentity| async move {
                HttpResponse::Ok().body(identity.email().to_owned())
            }),
        )
    }

    #[actix_web::test]
    async fn missing_cookie_yields_not_authorized() {
        let app = test::init_service(guarded_app(TokenCodec::from_secret(SECRET))).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/guarded").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = test::read_body(res).await;
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(value["message"], "Not Authorized");
    }

    #[actix_web::test]
    async fn valid_cookie_binds_the_identity() {
        let codec = TokenCodec::from_secret(SECRET);
        let token = codec.sign("a@x.com", Duration::hours(1)).expect("signing succeeds");
        let app = test::init_service(guarded_app(codec)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/guarded")
                .cookie(actix_web::cookie::Cookie::new(TOKEN_COOKIE, token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "a@x.com");
    }

    #[actix_web::test]
    async fn expired_token_is_rejected() {
        let issued = chrono::Utc::now() - Duration::hours(2);
        let token = codec_at(issued)
            .sign("a@x.com", Duration::hours(1))
            .expect("signing succeeds");
        let app = test::init_service(guarded_app(TokenCodec::from_secret(SECRET))).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/guarded")
                .cookie(actix_web::cookie::Cookie::new(TOKEN_COOKIE, token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn foreign_signature_is_rejected() {
        let foreign = TokenCodec::from_secret(b"some-other-secret-some-other-sec!");
        let token = foreign
            .sign("a@x.com", Duration::hours(1))
            .expect("signing succeeds");
        let app = test::init_service(guarded_app(TokenCodec::from_secret(SECRET))).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/guarded")
                .cookie(actix_web::cookie::Cookie::new(TOKEN_COOKIE, token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
