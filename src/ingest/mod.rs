//! Warehouse-to-store batch pipeline
//!
//! Pulls listing rows out of the analytical warehouse, embeds each row's
//! descriptive text, and loads the vectorized documents into the search
//! store in bounded batches. A single bad row or failed batch does not
//! abort the run; the final report accounts for everything skipped.

pub mod warehouse;

use std::sync::Arc;

use futures::stream;
use futures::StreamExt;
use serde_json::Map;
use serde_json::Value;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::descriptive_text;
use crate::embeddings::normalize_row;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::errors::Result;
use crate::models::IngestReport;
use crate::schema;
use crate::store::DataApiClient;
use crate::store::PropertyStore;

pub use warehouse::WarehouseClient;
pub use warehouse::WarehouseReader;

/// Batch loader from the warehouse into the vector store.
///
/// Rows are processed in source-order windows of `batch_size`; each window
/// becomes at most one unordered insert. Embedding within a window runs
/// concurrently up to `concurrency` in-flight requests, with output order
/// preserved.
pub struct IngestService {
    warehouse: Arc<dyn WarehouseReader>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn PropertyStore>,
    batch_size: usize,
    progress_interval: usize,
    concurrency: usize,
}

impl IngestService {
    pub fn new(
        warehouse: Arc<dyn WarehouseReader>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn PropertyStore>,
        batch_size: usize,
        progress_interval: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            warehouse,
            embedder,
            store,
            batch_size: batch_size.max(1),
            progress_interval: progress_interval.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Wire up the real clients from configuration.
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let warehouse: Arc<dyn WarehouseReader> = Arc::new(WarehouseClient::from_config(config)?);
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingClient::new(
            EmbeddingConfig::from_app_config(config),
        )?);
        let store: Arc<dyn PropertyStore> = Arc::new(DataApiClient::from_config(config)?);

        Ok(Self::new(
            warehouse,
            embedder,
            store,
            config.ingest.batch_size,
            config.ingest.progress_interval,
            config.ingest.concurrency,
        ))
    }

    /// Run one full ingestion pass, optionally capped at `limit` source rows.
    ///
    /// # Errors
    /// Only the warehouse extraction can fail the run. Per-row embedding
    /// failures and per-batch insert failures are logged, counted in the
    /// report, and skipped.
    pub async fn run(&self, limit: Option<usize>) -> Result<IngestReport> {
        let rows = self.warehouse.fetch_rows(limit).await?;
        info!("Starting ingestion of {} rows", rows.len());

        let mut report = IngestReport::default();

        for window in rows.chunks(self.batch_size) {
            let documents = self.embed_window(window, &mut report).await;
            if documents.is_empty() {
                continue;
            }

            let batch_len = documents.len();
            match self.store.insert_many(documents).await {
                Ok(inserted) => {
                    report.batches_inserted += 1;
                    info!("Inserted batch of {inserted} documents");
                }
                Err(e) => {
                    report.batches_failed += 1;
                    error!("Batch insert of {batch_len} documents failed, continuing: {e}");
                }
            }
        }

        info!(
            "Ingestion finished: {} rows seen, {} embedded, {} skipped, {} batches inserted, {} batches failed",
            report.rows_seen,
            report.rows_embedded,
            report.rows_skipped,
            report.batches_inserted,
            report.batches_failed
        );
        Ok(report)
    }

    /// Embed one window of source rows, dropping rows whose embedding fails.
    async fn embed_window(
        &self,
        window: &[Map<String, Value>],
        report: &mut IngestReport,
    ) -> Vec<Value> {
        let embedded: Vec<Result<Value>> = stream::iter(window)
            .map(|row| self.embed_row(row))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut documents = Vec::with_capacity(embedded.len());
        for outcome in embedded {
            report.rows_seen += 1;
            match outcome {
                Ok(document) => {
                    report.rows_embedded += 1;
                    documents.push(document);
                }
                Err(e) => {
                    report.rows_skipped += 1;
                    warn!("Skipping row, embedding failed: {e}");
                }
            }
            if report.rows_seen % self.progress_interval == 0 {
                info!("Processed {} rows", report.rows_seen);
            }
        }
        documents
    }

    async fn embed_row(&self, row: &Map<String, Value>) -> Result<Value> {
        let normalized = normalize_row(row, &schema::EMBED_FIELDS);
        let text = descriptive_text(&normalized);
        let embedding = self.embedder.embed(&text).await?;

        let mut document = row.clone();
        document.insert(
            "$vector".to_string(),
            Value::Array(
                embedding
                    .into_iter()
                    .map(|v| {
                        serde_json::Number::from_f64(f64::from(v))
                            .map_or(Value::Null, Value::Number)
                    })
                    .collect(),
            ),
        );
        Ok(Value::Object(document))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::test_support::CountingEmbedder;
    use crate::test_support::RecordingStore;

    struct FixedWarehouse {
        rows: Vec<Map<String, Value>>,
    }

    #[async_trait]
    impl WarehouseReader for FixedWarehouse {
        async fn fetch_rows(&self, limit: Option<usize>) -> Result<Vec<Map<String, Value>>> {
            let mut rows = self.rows.clone();
            if let Some(limit) = limit {
                rows.truncate(limit);
            }
            Ok(rows)
        }
    }

    fn row(city: &str, price: u64) -> Map<String, Value> {
        let Value::Object(map) = json!({
            "city": city,
            "state": "ga",
            "price": price,
            "bedrooms": 3,
        }) else {
            unreachable!()
        };
        map
    }

    /// 250 source rows with one embed failure in the second window.
    fn rows_with_one_bad(total: usize, bad_index: usize) -> Vec<Map<String, Value>> {
        (0..total)
            .map(|i| {
                if i == bad_index {
                    row("failville", 100_000)
                } else {
                    row(&format!("city{i}"), 100_000 + i as u64)
                }
            })
            .collect()
    }

    fn service(
        rows: Vec<Map<String, Value>>,
        embedder: Arc<CountingEmbedder>,
        store: Arc<RecordingStore>,
    ) -> IngestService {
        IngestService::new(
            Arc::new(FixedWarehouse { rows }),
            embedder,
            store,
            100,
            200,
            8,
        )
    }

    #[tokio::test]
    async fn test_batches_align_to_source_windows_and_skip_failed_rows() {
        let embedder = Arc::new(CountingEmbedder::failing_on(4, "failville"));
        let store = Arc::new(RecordingStore::empty());
        let service = service(rows_with_one_bad(250, 150), embedder.clone(), store.clone());

        let report = service.run(None).await.unwrap();

        assert_eq!(report.rows_seen, 250);
        assert_eq!(report.rows_embedded, 249);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.batches_inserted, 3);
        assert_eq!(report.batches_failed, 0);
        assert_eq!(embedder.calls(), 250, "every row gets an embed attempt");

        // second window is short one document, the others stay full
        assert_eq!(store.batch_sizes(), vec![100, 99, 50]);

        let batches = store.inserted_batches.lock().unwrap();
        assert!(batches.iter().flatten().all(|doc| {
            doc.get("city").and_then(Value::as_str) != Some("failville")
        }));
        assert!(batches
            .iter()
            .flatten()
            .all(|doc| doc.get("$vector").is_some()));
    }

    #[tokio::test]
    async fn test_insert_failure_does_not_abort_the_run() {
        let embedder = Arc::new(CountingEmbedder::new(4));
        let store = Arc::new(RecordingStore::empty().failing_insert_at(1));
        let service = service(rows_with_one_bad(250, 150), embedder, store.clone());

        let report = service.run(None).await.unwrap();

        assert_eq!(report.batches_inserted, 2);
        assert_eq!(report.batches_failed, 1);
        assert_eq!(report.rows_seen, 250);
        // attempts: full, failed (recorded empty), full
        assert_eq!(store.batch_sizes(), vec![100, 0, 50]);
    }

    #[tokio::test]
    async fn test_limit_caps_source_rows() {
        let embedder = Arc::new(CountingEmbedder::new(4));
        let store = Arc::new(RecordingStore::empty());
        let service = service(rows_with_one_bad(250, 150), embedder.clone(), store.clone());

        let report = service.run(Some(42)).await.unwrap();

        assert_eq!(report.rows_seen, 42);
        assert_eq!(embedder.calls(), 42);
        assert_eq!(store.batch_sizes(), vec![42]);
    }

    #[tokio::test]
    async fn test_empty_warehouse_inserts_nothing() {
        let embedder = Arc::new(CountingEmbedder::new(4));
        let store = Arc::new(RecordingStore::empty());
        let service = service(Vec::new(), embedder, store.clone());

        let report = service.run(None).await.unwrap();

        assert_eq!(report.rows_seen, 0);
        assert_eq!(report.batches_inserted, 0);
        assert!(store.batch_sizes().is_empty());
    }
}
