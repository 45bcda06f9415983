//! Shared HTTP adapter state.
//!
//! Handlers receive the document store through `actix_web::web::Data` so they
//! only depend on the domain port and remain testable without real I/O. The
//! handle is constructor-injected at wiring time; there is no ambient global
//! store.

use std::sync::Arc;

use crate::domain::ports::DocumentStore;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Document store every resource family persists through.
    pub store: Arc<dyn DocumentStore>,
}

impl HttpState {
    /// Construct state around a store implementation.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}
