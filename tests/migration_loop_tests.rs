/// Migration loop tests
///
/// Drives `Migrator` against the in-memory store: scenarios from a clean
/// run, concurrent edits and re-runs.
/// Run with: cargo test --test migration_loop_tests
use async_trait::async_trait;
use docshift::{
    BatchQuery, CandidateDocument, CommitReceipt, ContentStore, InMemoryContentStore,
    MigrationConfig, Migrator, Result, Transaction,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

async fn seed_posts(store: &InMemoryContentStore, count: usize) {
    for i in 0..count {
        store
            .insert(json!({
                "_id": format!("post-{:04}", i),
                "_type": "post",
                "title": format!("Post {}", i),
                "body": [{"_type": "block", "text": format!("text {}", i)}],
            }))
            .await
            .unwrap();
    }
}

fn count_with(documents: &[Value], field: &str) -> usize {
    documents.iter().filter(|d| d.get(field).is_some()).count()
}

/// Edits one document behind the migrator's back right before the first
/// commit reaches the store.
struct ConcurrentEditor {
    inner: Arc<InMemoryContentStore>,
    target: String,
    armed: AtomicBool,
}

impl ConcurrentEditor {
    fn new(inner: Arc<InMemoryContentStore>, target: &str) -> Self {
        Self {
            inner,
            target: target.to_string(),
            armed: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl ContentStore for ConcurrentEditor {
    async fn fetch(&self, query: &BatchQuery) -> Result<Vec<CandidateDocument>> {
        self.inner.fetch(query).await
    }

    async fn commit(&self, transaction: &Transaction) -> Result<CommitReceipt> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.inner
                .set_field(&self.target, "title", json!("edited elsewhere"))
                .await?;
        }
        self.inner.commit(transaction).await
    }
}

#[tokio::test]
async fn test_150_documents_migrate_in_two_batches() {
    let store = InMemoryContentStore::new();
    seed_posts(&store, 150).await;

    let migrator = Migrator::new(store, &MigrationConfig::default()).unwrap();
    let report = migrator.run().await.unwrap();

    assert_eq!(report.batches, 2);
    assert_eq!(report.documents_migrated, 150);
    assert_eq!(report.transaction_ids.len(), 2);

    let store = migrator.store();
    assert_eq!(store.commit_count(), 2);
    assert_eq!(store.fetch_count(), 3);

    let documents = store.documents().await;
    assert_eq!(count_with(&documents, "excerpt"), 150);
    assert_eq!(count_with(&documents, "body"), 0);
}

#[tokio::test]
async fn test_empty_store_completes_without_commit() {
    let migrator = Migrator::new(InMemoryContentStore::new(), &MigrationConfig::default()).unwrap();

    let report = migrator.run().await.unwrap();

    assert!(report.is_noop());
    assert_eq!(migrator.store().fetch_count(), 1);
    assert_eq!(migrator.store().commit_count(), 0);
}

#[tokio::test]
async fn test_concurrent_edit_rejects_entire_batch() {
    let inner = Arc::new(InMemoryContentStore::new());
    seed_posts(&inner, 100).await;
    let before = inner.documents().await;

    let store = ConcurrentEditor::new(inner.clone(), "post-0042");
    let migrator = Migrator::new(store, &MigrationConfig::default()).unwrap();

    let err = migrator.run().await.unwrap_err();
    assert!(err.is_revision_conflict(), "unexpected error: {}", err);

    let after = inner.documents().await;
    assert_eq!(count_with(&after, "body"), 100);
    assert_eq!(count_with(&after, "excerpt"), 0);
    for (old, new) in before.iter().zip(&after) {
        if new["_id"] == json!("post-0042") {
            assert_eq!(new["title"], json!("edited elsewhere"));
            assert_eq!(new["body"], old["body"]);
        } else {
            assert_eq!(old, new);
        }
    }
    assert_eq!(inner.commit_count(), 1);
}

#[tokio::test]
async fn test_rerun_after_conflict_finishes_the_job() {
    let inner = Arc::new(InMemoryContentStore::new());
    seed_posts(&inner, 30).await;
    let config = MigrationConfig::default().batch_size(10);

    let failing = Migrator::new(ConcurrentEditor::new(inner.clone(), "post-0005"), &config).unwrap();
    assert!(failing.run().await.unwrap_err().is_revision_conflict());

    let report = Migrator::new(inner.clone(), &config).unwrap().run().await.unwrap();
    assert_eq!(report.documents_migrated, 30);

    let documents = inner.documents().await;
    assert_eq!(count_with(&documents, "body"), 0);
    let edited = inner.get("post-0005").await.unwrap();
    assert_eq!(edited["title"], json!("edited elsewhere"));
    assert_eq!(edited["excerpt"][0]["text"], json!("text 5"));
}

#[tokio::test]
async fn test_conflict_in_later_batch_keeps_earlier_batches() {
    let inner = Arc::new(InMemoryContentStore::new());
    seed_posts(&inner, 20).await;

    // Commit the first batch cleanly, then interfere with the second.
    let config = MigrationConfig::default().batch_size(10);
    let first = Migrator::new(inner.clone(), &config).unwrap();
    let batch = first.fetch_batch().await.unwrap();
    first.commit_batch(first.build_patches(&batch)).await.unwrap();

    let failing = Migrator::new(ConcurrentEditor::new(inner.clone(), "post-0015"), &config).unwrap();
    assert!(failing.run().await.is_err());

    let documents = inner.documents().await;
    assert_eq!(count_with(&documents, "excerpt"), 10);
    assert_eq!(count_with(&documents, "body"), 10);
}

#[tokio::test]
async fn test_migration_is_idempotent() {
    let once = Arc::new(InMemoryContentStore::new());
    seed_posts(&once, 25).await;
    let config = MigrationConfig::default().batch_size(7);

    Migrator::new(once.clone(), &config).unwrap().run().await.unwrap();
    let after_first = once.documents().await;

    let second = Migrator::new(once.clone(), &config).unwrap().run().await.unwrap();
    assert!(second.is_noop());
    assert_eq!(once.documents().await, after_first);
}

#[tokio::test]
async fn test_committed_documents_are_never_refetched() {
    let store = Arc::new(InMemoryContentStore::new());
    seed_posts(&store, 12).await;
    let migrator = Migrator::new(store.clone(), &MigrationConfig::default().batch_size(5)).unwrap();

    let mut seen = std::collections::HashSet::new();
    loop {
        let batch = migrator.fetch_batch().await.unwrap();
        if batch.is_empty() {
            break;
        }
        for candidate in &batch {
            assert!(seen.insert(candidate.id().to_string()), "refetched {}", candidate.id());
        }
        migrator.commit_batch(migrator.build_patches(&batch)).await.unwrap();
    }
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn test_only_target_type_and_fields_change() {
    let store = Arc::new(InMemoryContentStore::new());
    store
        .insert(json!({"_id": "p1", "_type": "post", "body": "x", "title": "T", "tags": ["a"]}))
        .await
        .unwrap();
    store
        .insert(json!({"_id": "a1", "_type": "author", "body": "bio"}))
        .await
        .unwrap();
    let author_before = store.get("a1").await.unwrap();

    Migrator::new(store.clone(), &MigrationConfig::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    let post = store.get("p1").await.unwrap();
    let mut fields: Vec<&String> = post.as_object().unwrap().keys().collect();
    fields.sort();
    assert_eq!(fields, vec!["_id", "_rev", "_type", "excerpt", "tags", "title"]);
    assert_eq!(post["excerpt"], json!("x"));
    assert_eq!(post["title"], json!("T"));
    assert_eq!(post["tags"], json!(["a"]));
    assert_eq!(store.get("a1").await.unwrap(), author_before);
}

#[tokio::test]
async fn test_custom_rename_author_namefield_to_name() {
    let store = Arc::new(InMemoryContentStore::new());
    store
        .insert(json!({"_id": "au1", "_type": "author", "namefield": "Ada"}))
        .await
        .unwrap();

    let config = MigrationConfig::new("author", "namefield", "name");
    let report = Migrator::new(store.clone(), &config).unwrap().run().await.unwrap();

    assert_eq!(report.documents_migrated, 1);
    let author = store.get("au1").await.unwrap();
    assert_eq!(author["name"], json!("Ada"));
    assert!(author.get("namefield").is_none());
}
