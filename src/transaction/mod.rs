// ============================================================================
// Transaction Module
// ============================================================================
//
// A transaction is an ordered set of guarded patches that the store applies
// all-or-nothing. Every patch carries the revision observed at fetch time, so
// a single concurrently modified document rejects the whole batch.
//
// ============================================================================

pub mod receipt;
pub mod state;

pub use receipt::{CommitReceipt, MutationResult};
pub use state::Transaction;
