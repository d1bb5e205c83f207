use clap::Parser;
use docshift::MigrationConfig;
use docshift::migration::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_DOCUMENT_TYPE, DEFAULT_SOURCE_FIELD, DEFAULT_TARGET_FIELD,
};

/// Every flag is optional; a bare invocation runs the default rename.
#[derive(Parser, Debug)]
#[command(name = "docshift")]
#[command(version)]
#[command(about = "Rename a field on every document of one type, in revision-guarded batches")]
pub struct Cli {
    /// Document type to migrate
    #[arg(long = "type", default_value = DEFAULT_DOCUMENT_TYPE)]
    pub document_type: String,

    /// Field to move the value out of
    #[arg(long, default_value = DEFAULT_SOURCE_FIELD)]
    pub from: String,

    /// Field to move the value into
    #[arg(long, default_value = DEFAULT_TARGET_FIELD)]
    pub to: String,

    /// Documents per fetch and per transaction
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Log the first batch of patches without committing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn migration_config(&self) -> MigrationConfig {
        MigrationConfig::new(&self.document_type, &self.from, &self.to)
            .batch_size(self.batch_size)
            .dry_run(self.dry_run)
    }
}
