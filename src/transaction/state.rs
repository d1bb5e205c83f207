// ============================================================================
// Transaction Builder
// ============================================================================

use crate::core::{Patch, PatchOperations, Result};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Accumulates patches for one atomic commit.
///
/// # Examples
///
/// ```
/// use docshift::{Patch, PatchOperations, Transaction};
///
/// let tx = Transaction::new().patch(Patch::new(
///     "post-1",
///     PatchOperations {
///         set: Default::default(),
///         unset: vec!["body".to_string()],
///         if_revision_id: "rev-1".to_string(),
///     },
/// ));
/// assert_eq!(tx.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: String,
    patches: Vec<Patch>,
}

#[derive(Serialize)]
struct MutationsBody<'a> {
    #[serde(rename = "transactionId")]
    transaction_id: &'a str,
    mutations: Vec<PatchMutation<'a>>,
}

#[derive(Serialize)]
struct PatchMutation<'a> {
    patch: PatchBody<'a>,
}

#[derive(Serialize)]
struct PatchBody<'a> {
    id: &'a str,
    #[serde(flatten)]
    operations: &'a PatchOperations,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patches: Vec::new(),
        }
    }

    /// Client-chosen transaction id, echoed back by the store on commit.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn patch(mut self, patch: Patch) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn push(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Request body for the store's mutate endpoint.
    pub fn to_mutations(&self) -> Result<Value> {
        let body = MutationsBody {
            transaction_id: &self.id,
            mutations: self
                .patches
                .iter()
                .map(|p| PatchMutation {
                    patch: PatchBody {
                        id: &p.id,
                        operations: &p.operations,
                    },
                })
                .collect(),
        };
        Ok(serde_json::to_value(body)?)
    }
}

impl FromIterator<Patch> for Transaction {
    fn from_iter<I: IntoIterator<Item = Patch>>(iter: I) -> Self {
        let mut tx = Transaction::new();
        tx.patches.extend(iter);
        tx
    }
}
