//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{DocumentId, Error};

/// Parse a path identifier, failing with a format error rather than a 404.
pub(crate) fn parse_document_id(raw: &str) -> Result<DocumentId, Error> {
    DocumentId::parse(raw).map_err(|_| {
        Error::invalid_request("record id must be 24 hexadecimal characters").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}

/// Standard error for a required body field that is absent.
pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}
