use super::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// System attribute holding the document identifier.
pub const ID_ATTRIBUTE: &str = "_id";
/// System attribute holding the revision token.
pub const REVISION_ATTRIBUTE: &str = "_rev";
/// System attribute holding the document type.
pub const TYPE_ATTRIBUTE: &str = "_type";

/// Identity of a stored document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub revision: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            revision: revision.into(),
        }
    }
}

/// A document that still carries the field being migrated away from.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDocument {
    pub reference: DocumentRef,
    pub value: Value,
}

impl CandidateDocument {
    pub fn new(reference: DocumentRef, value: Value) -> Self {
        Self { reference, value }
    }

    pub fn id(&self) -> &str {
        &self.reference.id
    }

    pub fn revision(&self) -> &str {
        &self.reference.revision
    }

    /// Decodes one projected record of the shape `{_id, _rev, <source_field>}`.
    pub fn from_projection(record: Value, source_field: &str) -> Result<Self> {
        let Value::Object(mut fields) = record else {
            return Err(MigrationError::DecodeError(format!(
                "expected a document object, got {}",
                record
            )));
        };

        let id = take_string(&mut fields, ID_ATTRIBUTE)?;
        let revision = take_string(&mut fields, REVISION_ATTRIBUTE)?;
        let value = fields.remove(source_field).ok_or_else(|| {
            MigrationError::DecodeError(format!(
                "document '{}' is missing projected field '{}'",
                id, source_field
            ))
        })?;

        Ok(Self::new(DocumentRef::new(id, revision), value))
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(MigrationError::DecodeError(format!(
            "attribute '{}' must be a string, got {}",
            key, other
        ))),
        None => Err(MigrationError::DecodeError(format!(
            "record is missing attribute '{}'",
            key
        ))),
    }
}

/// The mutation applied to one document.
///
/// Field order matches the audit format `{"set":..,"unset":..,"ifRevisionID":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperations {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
    #[serde(rename = "ifRevisionID")]
    pub if_revision_id: String,
}

/// A guarded patch: operations plus the document they target.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub id: String,
    pub operations: PatchOperations,
}

impl Patch {
    pub fn new(id: impl Into<String>, operations: PatchOperations) -> Self {
        Self {
            id: id.into(),
            operations,
        }
    }

    pub fn if_revision_id(&self) -> &str {
        &self.operations.if_revision_id
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operations = serde_json::to_string(&self.operations).map_err(|_| fmt::Error)?;
        write!(f, "{} => {}", self.id, operations)
    }
}
