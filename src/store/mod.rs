//! Vector document store module
//!
//! Talks to an Astra-style Data API collection: one combined
//! similarity-plus-filter `find` for the serving path, and unordered
//! `insertMany` batches for ingestion.

pub mod client;

use async_trait::async_trait;
use serde_json::Value;

pub use client::DataApiClient;

use crate::errors::Result;
use crate::models::ScoredDocument;
use crate::query::FilterExpression;

/// Seam over the retrieval store.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Hybrid retrieval: rank by similarity to `embedding`, constrained to
    /// documents satisfying `filter`, capped at `limit`.
    ///
    /// # Errors
    /// Store unreachable or query malformed yields `Retrieval`; no partial
    /// results are fabricated.
    async fn find_similar(
        &self,
        embedding: &[f32],
        filter: &FilterExpression,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>>;

    /// Unordered bulk insert. Returns the number of inserted documents.
    async fn insert_many(&self, documents: Vec<Value>) -> Result<usize>;
}
