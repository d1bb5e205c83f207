use super::StoreConfig;
use crate::core::{CandidateDocument, MigrationError, Result};
use crate::interface::ContentStore;
use crate::query::BatchQuery;
use crate::transaction::{CommitReceipt, Transaction};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// `ContentStore` backed by the hosted HTTP API.
///
/// Requests carry no timeout; a hung call is bounded only by the transport.
/// Commits ask for `visibility=sync` so that the next fetch observes them.
pub struct HttpContentStore {
    config: StoreConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Option<Vec<Value>>,
}

impl HttpContentStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                MigrationError::ConfigError("token contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status.as_u16(), &body))
    }
}

/// Map a non-success response to the error taxonomy.
///
/// 409 is what the store answers when an `ifRevisionID` precondition fails.
pub fn error_for_status(status: u16, body: &str) -> MigrationError {
    let message = describe_error_body(body);
    match status {
        409 => MigrationError::RevisionConflict(message),
        401 | 403 => MigrationError::Unauthorized(message),
        _ => MigrationError::StoreError { status, message },
    }
}

fn describe_error_body(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let candidates = [
        json.pointer("/error/description"),
        json.pointer("/message"),
        json.pointer("/error"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| json.to_string())
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, query: &BatchQuery) -> Result<Vec<CandidateDocument>> {
        let groq = query.to_groq();
        debug!(query = %groq, document_type = query.document_type(), "fetching batch");

        let response = self
            .client
            .get(self.config.query_url())
            .query(&query.url_params())
            .send()
            .await?;
        let body: QueryResponse = Self::check(response).await?.json().await?;

        body.result
            .unwrap_or_default()
            .into_iter()
            .map(|record| CandidateDocument::from_projection(record, query.source_field()))
            .collect()
    }

    async fn commit(&self, transaction: &Transaction) -> Result<CommitReceipt> {
        debug!(
            transaction_id = transaction.id(),
            patches = transaction.len(),
            "committing transaction"
        );

        let response = self
            .client
            .post(self.config.mutate_url())
            .query(&[("returnIds", "true"), ("visibility", "sync")])
            .json(&transaction.to_mutations()?)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_status_maps_to_revision_conflict() {
        let body = r#"{"error":{"description":"Document `a` has unexpected revision ID (`r1`), expected `r2`","type":"mutationError"}}"#;
        match error_for_status(409, body) {
            MigrationError::RevisionConflict(msg) => assert!(msg.contains("unexpected revision")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_auth_statuses_map_to_unauthorized() {
        let body = r#"{"error":"Unauthorized","message":"Session not found","statusCode":401}"#;
        match error_for_status(401, body) {
            MigrationError::Unauthorized(msg) => assert_eq!(msg, "Session not found"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            error_for_status(403, "forbidden"),
            MigrationError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_other_statuses_keep_code_and_raw_text() {
        match error_for_status(502, "  bad gateway \n") {
            MigrationError::StoreError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(HttpContentStore::new(StoreConfig::new("", "d")).is_err());
        assert!(HttpContentStore::new(StoreConfig::new("p", "d").token("bad\ntoken")).is_err());
        assert!(HttpContentStore::new(StoreConfig::new("p", "d").token("ok")).is_ok());
    }
}
