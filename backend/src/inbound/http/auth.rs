//! Session issuance and teardown.
//!
//! ```text
//! POST /jwt    {"email":"a@x.com"}  -> sets the token cookie
//! POST /logout                      -> clears the token cookie
//! ```
//!
//! Sessions are stateless capability tokens: nothing is stored server-side,
//! logout simply instructs the client to drop the cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{post, web, HttpResponse};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::TokenCodec;
use crate::inbound::http::identity::TOKEN_COOKIE;
use crate::inbound::http::ApiResult;

/// Session lifetime granted on login.
const SESSION_TTL_HOURS: i64 = 1;

/// Cookie attributes conditioned on the deployment environment.
///
/// Development keeps `SameSite=Strict` without `Secure` so a local frontend
/// over plain HTTP can authenticate; production switches to `SameSite=None`
/// with `Secure` so credentialed cross-site requests from the allowed origins
/// deliver the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
}

impl CookiePolicy {
    /// Policy for local development deployments.
    #[must_use]
    pub fn development() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Strict,
        }
    }

    /// Policy for production deployments.
    #[must_use]
    pub fn production() -> Self {
        Self {
            secure: true,
            same_site: SameSite::None,
        }
    }

    /// Build the session cookie carrying a freshly signed token.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish()
    }

    /// Build the removal cookie sent on logout.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

/// Identity-bearing login body for `POST /jwt`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TokenRequest {
    /// Email the session is issued for.
    pub email: String,
}

/// Issue a session token for the posted identity and set the cookie.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Session established", headers(("Set-Cookie" = String, description = "Session token cookie"))),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "issueToken",
    security([])
)]
#[post("/jwt")]
pub async fn issue_token(
    codec: web::Data<TokenCodec>,
    policy: web::Data<CookiePolicy>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<HttpResponse> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(crate::domain::Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })));
    }
    let token = codec.sign(email, Duration::hours(SESSION_TTL_HOURS))?;
    Ok(HttpResponse::Ok()
        .cookie(policy.session_cookie(token))
        .json(json!({ "success": true })))
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", headers(("Set-Cookie" = String, description = "Expired token cookie")))
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(policy: web::Data<CookiePolicy>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(policy.removal_cookie())
        .json(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    const SECRET: &[u8] = b"auth-test-secret-auth-test-secret!!!";

    fn auth_app(
        policy: CookiePolicy,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(TokenCodec::from_secret(SECRET)))
            .app_data(web::Data::new(policy))
            .service(issue_token)
            .service(logout)
    }

    #[actix_web::test]
    async fn issues_a_http_only_cookie_and_reports_success() {
        let app = test::init_service(auth_app(CookiePolicy::development())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/jwt")
                .set_json(TokenRequest {
                    email: "a@x.com".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .expect("token cookie set");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), None);
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));

        let body = test::read_body(res).await;
        let value: Value = serde_json::from_slice(&body).expect("response JSON");
        assert_eq!(value["success"], true);
    }

    #[actix_web::test]
    async fn production_policy_marks_the_cookie_cross_site() {
        let app = test::init_service(auth_app(CookiePolicy::production())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/jwt")
                .set_json(TokenRequest {
                    email: "a@x.com".into(),
                })
                .to_request(),
        )
        .await;
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .expect("token cookie set");
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[actix_web::test]
    async fn rejects_blank_email() {
        let app = test::init_service(auth_app(CookiePolicy::development())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/jwt")
                .set_json(TokenRequest { email: "   ".into() })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn logout_expires_the_cookie() {
        let app = test::init_service(auth_app(CookiePolicy::development())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/logout").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .expect("removal cookie set");
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}
