//! Document-store value types.
//!
//! Records are schemaless JSON objects keyed by a 24-hex-character
//! identifier. Reports mirror the wire shape the store driver exposes to
//! clients (`matchedCount`, `modifiedCount`, `upsertedId`, `deletedCount`).

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field embedded in stored documents.
pub const ID_FIELD: &str = "_id";

/// Error raised when parsing a malformed document identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document id must be 24 hexadecimal characters, got {value:?}")]
pub struct DocumentIdError {
    value: String,
}

/// Unique document identifier: 24 lowercase hexadecimal characters whose
/// first eight encode the creation time in seconds.
///
/// Sorting freshly generated identifiers therefore approximates creation
/// order, matching the descending-by-id listing contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse an identifier from its textual form.
    ///
    /// # Errors
    /// Returns [`DocumentIdError`] unless the input is exactly 24 hex
    /// characters. Uppercase hex digits are normalised to lowercase.
    pub fn parse(value: &str) -> Result<Self, DocumentIdError> {
        if value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(DocumentIdError {
                value: value.to_owned(),
            })
        }
    }

    /// Generate a fresh identifier stamped with `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let secs = u32::try_from(now.timestamp()).unwrap_or_default();
        let mut suffix = [0_u8; 8];
        rand::thread_rng().fill_bytes(&mut suffix);
        Self(format!("{secs:08x}{}", hex::encode(suffix)))
    }

    /// Textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Schemaless record stored in a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Fetch a field as a string slice.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Fetch a field as a signed integer.
    #[must_use]
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    /// Whether the document carries the field.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field, returning the previous value if any.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Identifier embedded in the document, when present and well formed.
    #[must_use]
    pub fn id(&self) -> Option<DocumentId> {
        self.get_str(ID_FIELD).and_then(|raw| DocumentId::parse(raw).ok())
    }

    /// Consume the document, yielding the underlying field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Single-field equality filter applied to list operations.
///
/// An empty filter matches every record. Unrecognized query keys never reach
/// this type; handlers ignore them and pass an empty filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Option<(String, Value)>);

impl Filter {
    /// Filter matching every record.
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    /// Filter matching records whose `field` equals `value`.
    #[must_use]
    pub fn field_eq(field: impl Into<String>, value: Value) -> Self {
        Self(Some((field.into(), value)))
    }

    /// Whether the document satisfies the filter.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match &self.0 {
            None => true,
            Some((field, value)) => document.get(field) == Some(value),
        }
    }
}

/// Outcome of an update or counter adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    /// Records matched by the identifier.
    pub matched_count: u64,
    /// Records actually changed.
    pub modified_count: u64,
    /// Identifier of the record created by an upsert, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<DocumentId>,
}

/// Outcome of a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    /// Records removed; zero when the identifier did not exist.
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("5f8d0d55b54764421b7156c1", true)]
    #[case("5F8D0D55B54764421B7156C1", true)]
    #[case("5f8d0d55b54764421b7156c", false)]
    #[case("5f8d0d55b54764421b7156c1a", false)]
    #[case("zf8d0d55b54764421b7156c1", false)]
    #[case("", false)]
    fn id_parsing_enforces_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(DocumentId::parse(raw).is_ok(), ok);
    }

    #[test]
    fn parsed_ids_normalise_to_lowercase() {
        let id = DocumentId::parse("5F8D0D55B54764421B7156C1").expect("valid id");
        assert_eq!(id.as_str(), "5f8d0d55b54764421b7156c1");
    }

    #[test]
    fn generated_ids_are_well_formed_and_distinct() {
        let now = Utc::now();
        let first = DocumentId::generate(now);
        let second = DocumentId::generate(now);
        assert!(DocumentId::parse(first.as_str()).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let mut doc = Document::new();
        doc.set("category", json!("beach cleanup"));
        assert!(Filter::empty().matches(&doc));
    }

    #[rstest]
    #[case(json!("beach cleanup"), true)]
    #[case(json!("forest walk"), false)]
    fn field_filter_compares_by_equality(#[case] wanted: Value, #[case] matched: bool) {
        let mut doc = Document::new();
        doc.set("category", json!("beach cleanup"));
        assert_eq!(Filter::field_eq("category", wanted).matches(&doc), matched);
    }

    #[test]
    fn update_report_serialises_driver_field_names() {
        let report = UpdateReport {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        };
        let value = serde_json::to_value(&report).expect("serializable report");
        assert_eq!(value, json!({ "matchedCount": 1, "modifiedCount": 1 }));
    }
}
