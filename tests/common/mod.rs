//! Fake dataset API shared by the HTTP and CLI tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub dataset: String,
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Canned behaviour: every fetch returns all remaining records, a successful
/// mutate removes the patched records.
#[derive(Default)]
pub struct FakeDataset {
    pub records: Mutex<Vec<Value>>,
    pub queries: Mutex<Vec<RecordedRequest>>,
    pub mutations: Mutex<Vec<RecordedRequest>>,
    pub reject_with: Mutex<Option<(StatusCode, Value)>>,
}

impl FakeDataset {
    pub fn with_records(records: Vec<Value>) -> Arc<Self> {
        let fake = Self::default();
        *fake.records.lock().unwrap() = records;
        Arc::new(fake)
    }

    pub fn reject_mutations(&self, status: StatusCode, body: Value) {
        *self.reject_with.lock().unwrap() = Some((status, body));
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn query_handler(
    State(fake): State<Arc<FakeDataset>>,
    Path(dataset): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    fake.queries.lock().unwrap().push(RecordedRequest {
        dataset,
        params,
        authorization: authorization(&headers),
        body: None,
    });
    let records = fake.records.lock().unwrap().clone();
    Json(json!({"ms": 1, "result": records}))
}

async fn mutate_handler(
    State(fake): State<Arc<FakeDataset>>,
    Path(dataset): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.mutations.lock().unwrap().push(RecordedRequest {
        dataset,
        params,
        authorization: authorization(&headers),
        body: Some(body.clone()),
    });

    if let Some((status, error)) = fake.reject_with.lock().unwrap().clone() {
        return (status, Json(error));
    }

    let ids: Vec<String> = body["mutations"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|m| m["patch"]["id"].as_str().map(str::to_string))
        .collect();
    fake.records
        .lock()
        .unwrap()
        .retain(|r| !ids.iter().any(|id| r["_id"] == json!(id)));

    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "operation": "update"}))
        .collect();
    (
        StatusCode::OK,
        Json(json!({"transactionId": body["transactionId"], "results": results})),
    )
}

pub async fn serve(fake: Arc<FakeDataset>) -> String {
    let app = Router::new()
        .route("/v2023-03-01/data/query/:dataset", get(query_handler))
        .route("/v2023-03-01/data/mutate/:dataset", post(mutate_handler))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn record(id: &str, rev: &str, body: Value) -> Value {
    json!({"_id": id, "_rev": rev, "body": body})
}
