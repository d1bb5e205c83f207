use super::Cli;
use anyhow::{Context, Result};
use docshift::{MigrationReport, StoreConfig};
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        let store = StoreConfig::from_env().context("failed to load store configuration")?;
        info!(
            project_id = %store.project_id,
            dataset = %store.dataset,
            api_version = %store.api_version,
            authenticated = store.token.is_some(),
            "connecting to content store"
        );

        docshift::migrate(store, &self.cli.migration_config())
            .await
            .context("migration failed")
    }
}

/// Progress goes to stdout; `RUST_LOG` overrides the default filter.
///
/// The per-batch `id => patch` listing and the completion notice are logged
/// at `info`. A filter above `info` for the `docshift` target (for example
/// `RUST_LOG=warn`) drops that audit trail.
pub fn init_tracing() {
    let ansi = std::io::stdout().is_terminal();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docshift=info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(ansi),
        )
        .init();
}
