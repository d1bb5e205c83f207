// ============================================================================
// docshift Library
// ============================================================================

pub mod core;
pub mod query;
pub mod transaction;
pub mod interface;
pub mod connection;
pub mod storage;
pub mod migration;
pub mod result;

// Re-export main types for convenience
pub use crate::core::{CandidateDocument, DocumentRef, MigrationError, Patch, PatchOperations, Result};
pub use query::BatchQuery;
pub use transaction::{CommitReceipt, MutationResult, Transaction};
pub use interface::ContentStore;
pub use connection::{HttpContentStore, StoreConfig};
pub use storage::InMemoryContentStore;
pub use migration::{FieldRename, MigrationConfig, Migrator};
pub use result::MigrationReport;

/// Connect to the hosted store described by `store` and run the migration.
///
/// # Examples
///
/// ```no_run
/// use docshift::{MigrationConfig, StoreConfig};
///
/// # async fn demo() -> docshift::Result<()> {
/// let store = StoreConfig::from_env()?;
/// let report = docshift::migrate(store, &MigrationConfig::default()).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn migrate(store: StoreConfig, config: &MigrationConfig) -> Result<MigrationReport> {
    let store = HttpContentStore::new(store)?;
    Migrator::new(store, config)?.run().await
}
