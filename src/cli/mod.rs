pub mod app;
pub mod args;

pub use app::{App, init_tracing};
pub use args::Cli;
