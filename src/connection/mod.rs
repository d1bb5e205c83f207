pub mod config;
pub mod http;

pub use config::StoreConfig;
pub use http::HttpContentStore;
