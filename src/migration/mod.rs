// ============================================================================
// Field Rename Migration
// ============================================================================
//
// fetch batch -> build guarded patches -> commit as one transaction -> repeat
//
// The revision precondition on every patch makes the loop safe next to other
// writers, and the selection predicate (source field defined) makes it safe to
// run again after any failure.
//
// ============================================================================

pub mod config;
pub mod plan;
pub mod runner;

pub use config::MigrationConfig;
pub use plan::FieldRename;
pub use runner::{Migrator, describe_batch};
