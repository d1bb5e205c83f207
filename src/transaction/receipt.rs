use serde::{Deserialize, Serialize};

/// Outcome of one mutation inside a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub id: String,
    #[serde(default)]
    pub operation: String,
}

/// What the store reports after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

impl CommitReceipt {
    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.id.as_str())
    }

    pub fn mutation_count(&self) -> usize {
        self.results.len()
    }
}
