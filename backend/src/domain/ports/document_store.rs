//! Port for the abstract document store.
//!
//! The [`DocumentStore`] trait is the only way handlers reach persisted
//! records. Adapters provide the storage engine; the port pins down the
//! contracts the rest of the system relies on:
//!
//! - `list` returns matches newest first (descending insertion order);
//! - `update` upserts: a missing identifier creates a record from exactly
//!   the supplied fields;
//! - `delete` on a missing identifier reports zero affected records;
//! - `adjust_counter` applies `field += delta` atomically at the store
//!   level, never read-modify-write in application code, and does not clamp
//!   at zero.

use async_trait::async_trait;

use crate::domain::document::{DeleteReport, Document, DocumentId, Filter, UpdateReport};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    ///
    /// Store failures are not classified further; adapters map them to a
    /// generic internal error at the transport boundary.
    pub enum DocumentStoreError {
        /// The backing store rejected or failed the operation.
        Backend { message: String } =>
            "document store backend failure: {message}",
    }
}

/// Abstract CRUD + query interface over a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List records matching an equality filter, newest first.
    async fn list(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Fetch one record by identifier.
    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Insert a record, assigning it a fresh identifier.
    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Document, DocumentStoreError>;

    /// Apply a partial field update, creating the record when missing.
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> Result<UpdateReport, DocumentStoreError>;

    /// Delete a record; a missing identifier is reported, not an error.
    async fn delete(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DeleteReport, DocumentStoreError>;

    /// Atomically apply `field += delta` on one record.
    async fn adjust_counter(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<UpdateReport, DocumentStoreError>;
}
