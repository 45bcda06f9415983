//! Resolved session identity and the ownership policy.
//!
//! An [`Identity`] only exists after the session token has been verified, so
//! evaluating the ownership policy without an authenticated caller is
//! unrepresentable by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Outcome of an ownership policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The resolved identity matches the claimed identity.
    Allow,
    /// The resolved identity does not match; adapters map this to 403.
    Deny,
}

/// Identity claim resolved from a verified session token.
///
/// Carried inside the signed token and bound to the request context by the
/// identity guard; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    email: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Identity {
    /// Construct an identity from verified token claims.
    #[must_use]
    pub fn new(email: impl Into<String>, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            issued_at,
            expires_at,
        }
    }

    /// Email address the session was issued for.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Instant the backing token was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Instant the backing token expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Ownership policy: allow iff the claimed identity equals this identity's
    /// email. Exact, case-sensitive comparison; no normalisation.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{AccessDecision, Identity};
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let identity = Identity::new("a@x.com", now, now);
    /// assert_eq!(identity.authorize("a@x.com"), AccessDecision::Allow);
    /// assert_eq!(identity.authorize("A@x.com"), AccessDecision::Deny);
    /// ```
    #[must_use]
    pub fn authorize(&self, claimed: &str) -> AccessDecision {
        if self.email == claimed {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }

    /// Evaluate the ownership policy, producing the standard 403 error on a
    /// mismatch.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] when the claimed identity does not match.
    pub fn require_match(&self, claimed: &str) -> Result<(), Error> {
        match self.authorize(claimed) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny => Err(Error::forbidden("Forbidden")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn identity(email: &str) -> Identity {
        let now = Utc::now();
        Identity::new(email, now, now + chrono::Duration::hours(1))
    }

    #[rstest]
    #[case("a@x.com", "a@x.com", AccessDecision::Allow)]
    #[case("a@x.com", "b@x.com", AccessDecision::Deny)]
    #[case("a@x.com", "A@x.com", AccessDecision::Deny)]
    #[case("a@x.com", "a@x.com ", AccessDecision::Deny)]
    #[case("a@x.com", "", AccessDecision::Deny)]
    fn authorize_is_exact_and_case_sensitive(
        #[case] resolved: &str,
        #[case] claimed: &str,
        #[case] expected: AccessDecision,
    ) {
        assert_eq!(identity(resolved).authorize(claimed), expected);
    }

    #[test]
    fn require_match_maps_deny_to_forbidden() {
        let error = identity("a@x.com")
            .require_match("b@x.com")
            .expect_err("mismatch must be denied");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
