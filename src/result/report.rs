use crate::transaction::CommitReceipt;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Summary of a migration run that reached the end of its candidate set.
///
/// Failed runs produce no report: committed batches stay applied and the
/// remedy is to run again.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub batches: usize,
    pub documents_migrated: usize,
    pub transaction_ids: Vec<String>,
    pub dry_run: bool,
    /// Documents found but left untouched because of `dry_run`.
    pub documents_pending: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl MigrationReport {
    pub fn start(dry_run: bool) -> Self {
        Self {
            batches: 0,
            documents_migrated: 0,
            transaction_ids: Vec::new(),
            dry_run,
            documents_pending: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_batch(&mut self, receipt: &CommitReceipt, documents: usize) {
        self.batches += 1;
        self.documents_migrated += documents;
        self.transaction_ids.push(receipt.transaction_id.clone());
    }

    pub fn record_pending(&mut self, documents: usize) {
        self.documents_pending += documents;
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn is_noop(&self) -> bool {
        self.batches == 0 && self.documents_pending == 0
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            return write!(
                f,
                "Dry run: {} document(s) in the first batch would be migrated",
                self.documents_pending
            );
        }
        write!(
            f,
            "Migrated {} document(s) in {} batch(es)",
            self.documents_migrated, self.batches
        )?;
        if let Some(finished) = self.finished_at {
            let elapsed = finished - self.started_at;
            write!(f, " in {} ms", elapsed.num_milliseconds())?;
        }
        Ok(())
    }
}
