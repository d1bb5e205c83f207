use crate::core::{MigrationError, Result};
use std::fmt;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2023-03-01";

pub const ENV_PROJECT_ID: &str = "SANITY_STUDIO_PROJECT_ID";
pub const ENV_DATASET: &str = "SANITY_STUDIO_PROJECT_DATASET";
pub const ENV_TOKEN: &str = "SANITY_STUDIO_PROJECT_TOKEN";
pub const ENV_API_VERSION: &str = "SANITY_API_VERSION";
pub const ENV_API_HOST: &str = "SANITY_API_HOST";

/// Content store connection configuration
///
/// Values are passed through to the store as given; the only requirement is
/// that a project id and dataset exist so that request URLs can be built.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project identifier, also the API subdomain
    pub project_id: String,

    /// Dataset name
    pub dataset: String,

    /// Bearer token; requests are anonymous without one
    pub token: Option<String>,

    /// API version string, with or without a leading `v`
    pub api_version: String,

    /// Overrides `https://<project_id>.api.sanity.io`
    pub api_host: Option<String>,
}

impl StoreConfig {
    /// Create a new store configuration
    pub fn new(project_id: &str, dataset: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            api_host: None,
        }
    }

    /// Set the access token
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set the API version
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Set the API host, e.g. `http://127.0.0.1:3333`
    pub fn api_host(mut self, host: &str) -> Self {
        self.api_host = Some(host.to_string());
        self
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| MigrationError::ConfigError(format!("{} is not set", key)))
        };

        let mut config = Self::new(&required(ENV_PROJECT_ID)?, &required(ENV_DATASET)?);
        if let Some(token) = var(ENV_TOKEN) {
            config = config.token(&token);
        }
        if let Some(version) = var(ENV_API_VERSION) {
            config = config.api_version(&version);
        }
        if let Some(host) = var(ENV_API_HOST) {
            config = config.api_host(&host);
        }
        Ok(config)
    }

    /// `<host>/v<version>`
    pub fn base_url(&self) -> String {
        let host = match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        };
        let version = self.api_version.trim_start_matches('v');
        format!("{}/v{}", host, version)
    }

    pub fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.base_url(), self.dataset)
    }

    pub fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.base_url(), self.dataset)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(MigrationError::ConfigError(
                "project id cannot be empty".to_string(),
            ));
        }

        if self.dataset.trim().is_empty() {
            return Err(MigrationError::ConfigError(
                "dataset cannot be empty".to_string(),
            ));
        }

        if self.api_version.trim_start_matches('v').is_empty() {
            return Err(MigrationError::ConfigError(
                "api version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("api_version", &self.api_version)
            .field("api_host", &self.api_host)
            .finish()
    }
}
