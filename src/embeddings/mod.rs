//! Embeddings generation module
//!
//! Converts property rows and parsed queries into deterministic descriptive
//! text and turns that text into fixed-length vectors via an external
//! provider:
//! - OpenAI (text-embedding-3-large, text-embedding-3-small, etc.)
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use estaterag::config::AppConfig;
//! use estaterag::embeddings::Embedder;
//! use estaterag::embeddings::EmbeddingClient;
//! use estaterag::embeddings::EmbeddingConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::new(EmbeddingConfig::from_app_config(&config))?;
//!
//!     let embedding = client.embed("city: austin | state: tx").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod text;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use text::descriptive_text;
pub use text::normalize_row;

use crate::errors::Result;

/// Seam over the external embedding service.
///
/// One `embed` call per descriptive text per request: the adapter performs no
/// internal retries, so callers can reason about billing from call counts.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Convert text to a fixed-length vector.
    ///
    /// # Errors
    /// Any transport, rate-limit, or malformed-response failure surfaces as
    /// a single `Embedding` error kind.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        // Local endpoints are assumed to speak the Ollama API; anything else
        // gets the OpenAI wire format.
        let provider = if config.openai.endpoint.contains("localhost")
            || config.openai.endpoint.contains("127.0.0.1")
        {
            EmbeddingProvider::Ollama
        } else {
            EmbeddingProvider::OpenAI
        };

        Self {
            provider,
            model: config.openai.embedding_model.clone(),
            dimension: config.openai.embedding_dimension,
            endpoint: config.openai.endpoint.clone(),
            api_key: if provider == EmbeddingProvider::OpenAI {
                Some(config.openai.api_key.clone())
            } else {
                None
            },
        }
    }
}
