//! Data API client for the vector document store

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::errors::EstateRagError;
use crate::errors::Result;
use crate::models::ScoredDocument;
use crate::query::FilterExpression;
use crate::store::PropertyStore;

/// Maximum documents per `insertMany` request; larger batches are split.
const INSERT_CHUNK_SIZE: usize = 100;

/// HTTP client for an Astra-style JSON Data API collection.
pub struct DataApiClient {
    collection_url: String,
    token: String,
    client: Client,
}

impl DataApiClient {
    /// Create a new store client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        api_endpoint: &str,
        token: String,
        keyspace: &str,
        collection: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| EstateRagError::Http(e.to_string()))?;

        let collection_url = format!(
            "{}/api/json/v1/{keyspace}/{collection}",
            api_endpoint.trim_end_matches('/')
        );

        Ok(Self {
            collection_url,
            token,
            client,
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        Self::new(
            &config.store.api_endpoint,
            config.store.application_token.clone(),
            &config.store.keyspace,
            &config.store.collection,
        )
    }

    /// POST one Data API command to the collection endpoint and return the
    /// parsed body. Commands and errors share one wire format, so all store
    /// operations funnel through here.
    async fn command(&self, body: &Value, error_kind: fn(String) -> EstateRagError) -> Result<Value> {
        let response = self
            .client
            .post(&self.collection_url)
            .header("Token", &self.token)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| error_kind(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_kind(format!(
                "Data API error ({status}): {error_text}"
            )));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| error_kind(format!("Failed to parse response: {e}")))?;

        // Command-level errors come back in a 200 with an "errors" array.
        if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(error_kind(format!("Data API command failed: {errors:?}")));
            }
        }

        Ok(parsed)
    }
}

#[async_trait]
impl PropertyStore for DataApiClient {
    async fn find_similar(
        &self,
        embedding: &[f32],
        filter: &FilterExpression,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let command = json!({
            "find": {
                "filter": filter.to_json(),
                "sort": { "$vector": embedding },
                "options": {
                    "limit": limit,
                    "includeSimilarity": true,
                }
            }
        });

        debug!(
            "Store find: {} filter clauses, limit {limit}",
            filter.clauses().len()
        );

        let response = self.command(&command, EstateRagError::Retrieval).await?;

        let documents = response
            .get("data")
            .and_then(|d| d.get("documents"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EstateRagError::Retrieval("no documents array in find response".to_string())
            })?;

        let results = documents
            .iter()
            .map(|doc| {
                let mut document = doc.clone();
                let similarity = document
                    .as_object_mut()
                    .and_then(|obj| obj.remove("$similarity"))
                    .and_then(|v| v.as_f64())
                    .map(|v| v as f32);
                ScoredDocument {
                    document,
                    similarity,
                }
            })
            .collect();

        Ok(results)
    }

    async fn insert_many(&self, documents: Vec<Value>) -> Result<usize> {
        let mut inserted = 0;

        // The Data API caps insertMany payloads; mirror the cap client-side.
        for chunk in documents.chunks(INSERT_CHUNK_SIZE) {
            let command = json!({
                "insertMany": {
                    "documents": chunk,
                    "options": { "ordered": false }
                }
            });

            let response = self.command(&command, EstateRagError::Retrieval).await?;

            let chunk_inserted = response
                .get("status")
                .and_then(|s| s.get("insertedIds"))
                .and_then(Value::as_array)
                .map_or(chunk.len(), Vec::len);
            inserted += chunk_inserted;
        }

        info!("Inserted {inserted} documents into store");
        Ok(inserted)
    }
}
