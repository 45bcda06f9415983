//! Inbound HTTP adapters.
//!
//! Each resource family lives in its own module; `error` maps domain errors
//! onto HTTP responses and `identity` provides the session guard the guarded
//! routes extract.

pub mod auth;
pub mod error;
pub mod health;
pub mod identity;
pub mod posts;
pub mod requests;
pub mod state;
pub mod validation;

pub use error::ApiResult;
