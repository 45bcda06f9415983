//! Domain primitives and decisions.
//!
//! Everything in this module is transport agnostic: the session token codec,
//! the resolved identity with its ownership policy, the document-store value
//! types, and the error taxonomy adapters translate into wire responses.

pub mod document;
pub mod error;
pub mod identity;
pub mod ports;
pub mod token;
pub mod volunteering;

pub use self::document::{
    DeleteReport, Document, DocumentId, DocumentIdError, Filter, UpdateReport, ID_FIELD,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{AccessDecision, Identity};
pub use self::token::{TokenCodec, TokenError};
pub use self::volunteering::{RequestStatus, RequestStatusError};
