//! Vocabulary for the two resource families.
//!
//! Collection and field names follow the wire format clients already use;
//! they are centralised here so handlers and tests never spell them inline.

use serde::{Deserialize, Serialize};

/// Collection names in the document store.
pub mod collections {
    /// Volunteer posts published by organizers.
    pub const POSTS: &str = "AllVolunteerPost";
    /// Join requests submitted by volunteers.
    pub const REQUESTS: &str = "Request";
}

/// Field names shared across handlers.
pub mod fields {
    /// Owner of a volunteer post, and the organizer side of a request.
    pub const ORGANIZER_EMAIL: &str = "organizer_email";
    /// Requesting volunteer's email on a request.
    pub const V_EMAIL: &str = "v_email";
    /// Post category used for public filtering.
    pub const CATEGORY: &str = "category";
    /// Open capacity counter on a post. Mutated only through the atomic
    /// counter operation, never by generic field replacement.
    pub const VOLUNTEERS_NEEDED: &str = "volunteersNeeded";
    /// Request lifecycle state.
    pub const STATUS: &str = "status";
    /// Post a request refers to.
    pub const POST_ID: &str = "post_id";
}

/// Error raised when parsing an unknown request status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status {value:?}; expected pending, accepted or rejected")]
pub struct RequestStatusError {
    value: String,
}

/// Lifecycle state of a volunteer request.
///
/// Any known state may overwrite any other; no terminal states are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting an organizer decision.
    Pending,
    /// Approved by the organizer.
    Accepted,
    /// Declined by the organizer.
    Rejected,
}

impl RequestStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = RequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(RequestStatusError {
                value: other.to_owned(),
            }),
        }
    }
}
