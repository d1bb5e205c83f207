use super::FieldRename;
use crate::core::{MigrationError, Result};

pub const DEFAULT_DOCUMENT_TYPE: &str = "post";
pub const DEFAULT_SOURCE_FIELD: &str = "body";
pub const DEFAULT_TARGET_FIELD: &str = "excerpt";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// What to rename and how many documents to move per transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub document_type: String,
    pub source_field: String,
    pub target_field: String,

    /// Upper bound on documents per fetch and per transaction
    pub batch_size: usize,

    /// Log the first batch's patches without committing
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            source_field: DEFAULT_SOURCE_FIELD.to_string(),
            target_field: DEFAULT_TARGET_FIELD.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    pub fn new(document_type: &str, source_field: &str, target_field: &str) -> Self {
        Self {
            document_type: document_type.to_string(),
            source_field: source_field.to_string(),
            target_field: target_field.to_string(),
            ..Self::default()
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MigrationError::ConfigError(
                "batch_size must be > 0".to_string(),
            ));
        }
        self.plan().map(|_| ())
    }

    pub fn plan(&self) -> Result<FieldRename> {
        FieldRename::new(&self.document_type, &self.source_field, &self.target_field)
    }
}
