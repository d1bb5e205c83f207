use crate::core::{CandidateDocument, MigrationError, Patch, PatchOperations, Result};
use crate::query::{BatchQuery, validate_field_name};
use serde_json::Map;

/// Move the value of `source_field` into `target_field` on every document of
/// `document_type`, removing `source_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRename {
    document_type: String,
    source_field: String,
    target_field: String,
}

impl FieldRename {
    pub fn new(document_type: &str, source_field: &str, target_field: &str) -> Result<Self> {
        if document_type.trim().is_empty() {
            return Err(MigrationError::ConfigError(
                "document type cannot be empty".to_string(),
            ));
        }
        validate_field_name(source_field)?;
        validate_field_name(target_field)?;
        if source_field == target_field {
            return Err(MigrationError::ConfigError(format!(
                "source and target field are both '{}'",
                source_field
            )));
        }

        Ok(Self {
            document_type: document_type.to_string(),
            source_field: source_field.to_string(),
            target_field: target_field.to_string(),
        })
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    /// Selection of documents still in the old shape, `limit` at a time.
    pub fn query(&self, limit: usize) -> Result<BatchQuery> {
        BatchQuery::new(&self.document_type, &self.source_field, limit)
    }

    /// Set target, unset source, guarded by the revision seen at fetch time.
    pub fn build_patch(&self, candidate: &CandidateDocument) -> Patch {
        let mut set = Map::new();
        set.insert(self.target_field.clone(), candidate.value.clone());

        Patch::new(
            candidate.id(),
            PatchOperations {
                set,
                unset: vec![self.source_field.clone()],
                if_revision_id: candidate.revision().to_string(),
            },
        )
    }

    pub fn build_patches(&self, candidates: &[CandidateDocument]) -> Vec<Patch> {
        candidates.iter().map(|c| self.build_patch(c)).collect()
    }
}
