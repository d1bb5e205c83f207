use super::{FieldRename, MigrationConfig};
use crate::core::{CandidateDocument, Patch, Result};
use crate::interface::ContentStore;
use crate::query::BatchQuery;
use crate::result::MigrationReport;
use crate::transaction::{CommitReceipt, Transaction};
use tracing::{debug, info};

/// Drives a store from the old field shape to the new one, a batch at a time.
///
/// Each iteration fetches the next candidates, turns them into guarded
/// patches and commits them as one transaction. The loop ends when the query
/// comes back empty; it has no bound of its own, so a writer that keeps
/// reintroducing the source field keeps it running.
///
/// Errors are never retried here. A revision conflict leaves the rejected
/// batch untouched and the previously committed batches applied, and running
/// the migration again picks up whatever still matches.
pub struct Migrator<S> {
    store: S,
    plan: FieldRename,
    query: BatchQuery,
    dry_run: bool,
}

impl<S: ContentStore> Migrator<S> {
    pub fn new(store: S, config: &MigrationConfig) -> Result<Self> {
        config.validate()?;
        let plan = config.plan()?;
        let query = plan.query(config.batch_size)?;

        Ok(Self {
            store,
            plan,
            query,
            dry_run: config.dry_run,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn plan(&self) -> &FieldRename {
        &self.plan
    }

    pub fn query(&self) -> &BatchQuery {
        &self.query
    }

    /// Next slice of documents that still carry the source field.
    pub async fn fetch_batch(&self) -> Result<Vec<CandidateDocument>> {
        self.store.fetch(&self.query).await
    }

    pub fn build_patches(&self, candidates: &[CandidateDocument]) -> Vec<Patch> {
        self.plan.build_patches(candidates)
    }

    /// Submit `patches` as a single all-or-nothing transaction.
    pub async fn commit_batch(&self, patches: Vec<Patch>) -> Result<CommitReceipt> {
        let transaction: Transaction = patches.into_iter().collect();
        debug!(
            transaction_id = transaction.id(),
            patches = transaction.len(),
            "submitting batch"
        );
        self.store.commit(&transaction).await
    }

    /// Run until no candidates remain, or stop after the first batch when
    /// configured as a dry run.
    pub async fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::start(self.dry_run);
        info!(
            document_type = self.plan.document_type(),
            from = self.plan.source_field(),
            to = self.plan.target_field(),
            batch_size = self.query.limit(),
            dry_run = self.dry_run,
            "starting migration"
        );

        loop {
            let candidates = self.fetch_batch().await?;
            if candidates.is_empty() {
                info!("No more documents to migrate!");
                break;
            }

            let patches = self.build_patches(&candidates);
            info!(
                batch = report.batches + 1,
                documents = patches.len(),
                "Migrating batch:\n{}",
                describe_batch(&patches)
            );

            if self.dry_run {
                info!(
                    documents = patches.len(),
                    "dry run: nothing committed"
                );
                report.record_pending(patches.len());
                break;
            }

            let documents = patches.len();
            let receipt = self.commit_batch(patches).await?;
            info!(
                transaction_id = %receipt.transaction_id,
                documents,
                "batch committed"
            );
            report.record_batch(&receipt, documents);
        }

        Ok(report.finish())
    }
}

/// One `id => {"set":..,"unset":..,"ifRevisionID":..}` line per patch.
pub fn describe_batch(patches: &[Patch]) -> String {
    patches
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
