use crate::core::{
    CandidateDocument, DocumentRef, ID_ATTRIBUTE, MigrationError, Patch, REVISION_ATTRIBUTE,
    Result, TYPE_ATTRIBUTE,
};
use crate::interface::ContentStore;
use crate::query::BatchQuery;
use crate::transaction::{CommitReceipt, MutationResult, Transaction};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

type Document = Map<String, Value>;

/// Revisioned document store kept in process memory.
///
/// Mirrors the hosted store's rules closely enough to exercise the migration
/// loop: every mutation assigns a new `_rev`, `defined(field)` means present
/// and non-null, and a transaction is validated in full before any document
/// is touched.
pub struct InMemoryContentStore {
    /// Documents keyed by `_id`; iteration order is the fetch order.
    documents: RwLock<BTreeMap<String, Document>>,
    fetches: AtomicUsize,
    commits: AtomicUsize,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            fetches: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
        }
    }

    /// Create or replace a document. It must carry string `_id` and `_type`
    /// attributes; any `_rev` it carries is replaced by a fresh one.
    pub async fn insert(&self, document: Value) -> Result<DocumentRef> {
        let Value::Object(mut document) = document else {
            return Err(MigrationError::StoreError {
                status: 400,
                message: "document must be a JSON object".to_string(),
            });
        };

        let id = match document.get(ID_ATTRIBUTE) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(MigrationError::StoreError {
                    status: 400,
                    message: "document is missing a string '_id'".to_string(),
                });
            }
        };
        if !matches!(document.get(TYPE_ATTRIBUTE), Some(Value::String(_))) {
            return Err(MigrationError::StoreError {
                status: 400,
                message: format!("document '{}' is missing a string '_type'", id),
            });
        }

        let revision = new_revision();
        document.insert(REVISION_ATTRIBUTE.to_string(), Value::String(revision.clone()));
        self.documents.write().await.insert(id.clone(), document);
        Ok(DocumentRef::new(id, revision))
    }

    /// Set one field outside of any migration transaction, as a concurrent
    /// editor would. Returns the document's new revision.
    pub async fn set_field(&self, id: &str, field: &str, value: Value) -> Result<String> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| not_found(id))?;

        document.insert(field.to_string(), value);
        let revision = new_revision();
        document.insert(REVISION_ATTRIBUTE.to_string(), Value::String(revision.clone()));
        Ok(revision)
    }

    /// Bump a document's revision without changing its content.
    pub async fn touch(&self, id: &str) -> Result<String> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| not_found(id))?;

        let revision = new_revision();
        document.insert(REVISION_ATTRIBUTE.to_string(), Value::String(revision.clone()));
        Ok(revision)
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.documents.write().await.remove(id).is_some()
    }

    pub async fn get(&self, id: &str) -> Option<Value> {
        self.documents
            .read()
            .await
            .get(id)
            .cloned()
            .map(Value::Object)
    }

    /// Every stored document, ordered by id.
    pub async fn documents(&self) -> Vec<Value> {
        self.documents
            .read()
            .await
            .values()
            .cloned()
            .map(Value::Object)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `commit` calls received so far, including rejected ones.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch(&self, query: &BatchQuery) -> Result<Vec<CandidateDocument>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents.read().await;

        let candidates = documents
            .values()
            .filter(|doc| matches_query(doc, query))
            .take(query.limit())
            .map(|doc| project(doc, query.source_field()))
            .collect();

        Ok(candidates)
    }

    async fn commit(&self, transaction: &Transaction) -> Result<CommitReceipt> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.write().await;

        // Validate every precondition before mutating anything.
        for patch in transaction.patches() {
            check_revision(&documents, patch)?;
        }

        let revision = transaction.id().to_string();
        let mut staged: BTreeMap<String, Document> = BTreeMap::new();
        let mut results = Vec::with_capacity(transaction.len());

        for patch in transaction.patches() {
            let document = match staged.remove(&patch.id) {
                Some(doc) => doc,
                None => documents
                    .get(&patch.id)
                    .cloned()
                    .ok_or_else(|| not_found(&patch.id))?,
            };
            let updated = apply_patch(document, patch, &revision);
            staged.insert(patch.id.clone(), updated);
            results.push(MutationResult {
                id: patch.id.clone(),
                operation: "update".to_string(),
            });
        }

        documents.extend(staged);

        Ok(CommitReceipt {
            transaction_id: revision,
            results,
        })
    }
}

fn new_revision() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(id: &str) -> MigrationError {
    MigrationError::StoreError {
        status: 404,
        message: format!("document '{}' not found", id),
    }
}

fn is_defined(doc: &Document, field: &str) -> bool {
    doc.get(field).is_some_and(|v| !v.is_null())
}

fn matches_query(doc: &Document, query: &BatchQuery) -> bool {
    doc.get(TYPE_ATTRIBUTE).and_then(Value::as_str) == Some(query.document_type())
        && is_defined(doc, query.source_field())
}

fn project(doc: &Document, source_field: &str) -> CandidateDocument {
    let attribute = |name: &str| {
        doc.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    CandidateDocument::new(
        DocumentRef::new(attribute(ID_ATTRIBUTE), attribute(REVISION_ATTRIBUTE)),
        doc.get(source_field).cloned().unwrap_or(Value::Null),
    )
}

fn check_revision(documents: &BTreeMap<String, Document>, patch: &Patch) -> Result<()> {
    let Some(document) = documents.get(&patch.id) else {
        return Err(MigrationError::RevisionConflict(format!(
            "document '{}' no longer exists",
            patch.id
        )));
    };

    let actual = document
        .get(REVISION_ATTRIBUTE)
        .and_then(Value::as_str)
        .unwrap_or_default();
    if actual != patch.if_revision_id() {
        return Err(MigrationError::RevisionConflict(format!(
            "document '{}' has unexpected revision '{}', expected '{}'",
            patch.id,
            actual,
            patch.if_revision_id()
        )));
    }
    Ok(())
}

fn apply_patch(mut document: Document, patch: &Patch, revision: &str) -> Document {
    for (field, value) in &patch.operations.set {
        document.insert(field.clone(), value.clone());
    }
    for field in &patch.operations.unset {
        document.remove(field);
    }
    document.insert(
        REVISION_ATTRIBUTE.to_string(),
        Value::String(revision.to_string()),
    );
    document
}
