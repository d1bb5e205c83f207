mod cli;

use crate::cli::{App, Cli};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    cli::init_tracing();

    let app = App::new(Cli::parse());
    match app.run().await {
        Ok(report) => {
            info!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
