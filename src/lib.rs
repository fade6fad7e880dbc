pub mod api;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod models;
pub mod query;
pub mod rag;
pub mod schema;
pub mod store;

#[cfg(test)]
pub mod test_support;

pub use config::AppConfig;
pub use errors::*;
