//! Session token codec.
//!
//! Signs and verifies the compact, tamper-evident token carried in the session
//! cookie. Tokens are HS256 JWTs embedding the identity claim and an expiry;
//! there is no refresh or rotation, re-authentication issues a new token.
//!
//! Expiry is checked against an injected [`Clock`] rather than the library's
//! ambient system time so tests can move the clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Identity};

/// Reasons a token fails verification.
///
/// Both variants surface as 401 externally; they are distinguished so the
/// guard can log which kind was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The signature does not verify under the configured secret, or the
    /// token is malformed.
    #[error("session token signature is invalid")]
    BadSignature,
    /// The signature verifies but the expiry instant has passed.
    #[error("session token has expired")]
    Expired,
}

impl TokenError {
    /// Short identifier used in log fields.
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared HMAC secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TokenCodec {
    /// Build a codec from the raw HMAC secret and an injectable clock.
    #[must_use]
    pub fn new(secret: &[u8], clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Build a codec using the system clock.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(secret, Arc::new(DefaultClock))
    }

    /// Sign a token for `email` expiring `ttl` from now.
    ///
    /// Deterministic given identical input and clock readings.
    ///
    /// # Errors
    /// Returns [`Error::internal`] if JWT encoding fails.
    pub fn sign(&self, email: &str, ttl: Duration) -> Result<String, Error> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("failed to sign session token: {err}")))
    }

    /// Verify a token, returning the identity it was issued for.
    ///
    /// # Errors
    /// [`TokenError::BadSignature`] when the token is malformed or signed with
    /// a different secret; [`TokenError::Expired`] when `now >= exp`.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the injected clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::BadSignature)?;
        if self.clock.utc().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(Identity::new(
            data.claims.sub,
            timestamp(data.claims.iat),
            timestamp(data.claims.exp),
        ))
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
