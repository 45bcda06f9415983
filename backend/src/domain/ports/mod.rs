//! Domain ports: contracts adapters implement on behalf of the domain.

mod document_store;
pub(crate) mod macros;

pub use document_store::{DocumentStore, DocumentStoreError};
