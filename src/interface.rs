use async_trait::async_trait;
use crate::core::{CandidateDocument, Result};
use crate::query::BatchQuery;
use crate::transaction::{CommitReceipt, Transaction};

/// The remote document store as seen by the migration loop.
///
/// `HttpContentStore` talks to a hosted dataset; `InMemoryContentStore` keeps
/// documents in process for tests and rehearsals. Both honour the same
/// contract: `commit` applies every patch or none, and rejects the transaction
/// with `MigrationError::RevisionConflict` when any precondition fails.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a selection query and return the projected candidates.
    async fn fetch(&self, query: &BatchQuery) -> Result<Vec<CandidateDocument>>;

    /// Atomically apply all patches of `transaction`.
    async fn commit(&self, transaction: &Transaction) -> Result<CommitReceipt>;
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStore for std::sync::Arc<S> {
    async fn fetch(&self, query: &BatchQuery) -> Result<Vec<CandidateDocument>> {
        (**self).fetch(query).await
    }

    async fn commit(&self, transaction: &Transaction) -> Result<CommitReceipt> {
        (**self).commit(transaction).await
    }
}
