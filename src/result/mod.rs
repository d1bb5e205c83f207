pub mod report;

pub use report::MigrationReport;
