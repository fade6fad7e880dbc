//! End-to-end serving pipeline

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::descriptive_text;
use crate::embeddings::normalize_row;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::errors::Result;
use crate::errors::ValidationFailure;
use crate::llm::prompts;
use crate::llm::ChatModel;
use crate::llm::LlmClient;
use crate::models::SearchOutcome;
use crate::query::build_filter;
use crate::query::QueryParser;
use crate::rag::Summarizer;
use crate::schema;
use crate::store::DataApiClient;
use crate::store::PropertyStore;

/// The complete serving path for one natural-language property query.
///
/// Stages are sequentially dependent; per-request state lives on the stack
/// and the shared clients carry no per-request mutable fields, so one
/// instance serves concurrent requests.
pub struct PropertySearch {
    parser: QueryParser,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn PropertyStore>,
    summarizer: Summarizer,
    result_limit: usize,
}

impl PropertySearch {
    pub fn new(
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn PropertyStore>,
        result_limit: usize,
    ) -> Self {
        Self {
            parser: QueryParser::new(chat.clone()),
            embedder,
            store,
            summarizer: Summarizer::new(chat),
            result_limit,
        }
    }

    /// Wire up the real clients from configuration.
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let chat: Arc<dyn ChatModel> = Arc::new(LlmClient::from_config(config)?);
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingClient::new(
            EmbeddingConfig::from_app_config(config),
        )?);
        let store: Arc<dyn PropertyStore> = Arc::new(DataApiClient::from_config(config)?);

        Ok(Self::new(chat, embedder, store, config.server.result_limit))
    }

    /// Process one query end to end.
    ///
    /// # Errors
    /// - `Validation` when a gate rejects the input (no billable call made
    ///   past the failing gate)
    /// - `Embedding` / `Retrieval` / `Llm` for external-dependency failures
    ///
    /// Summary-generation failure is not an error: the outcome carries the
    /// retrieved properties with `summary: None`.
    pub async fn answer(&self, user_input: &str) -> Result<SearchOutcome> {
        info!("Processing property query");

        // Step 1: validate and extract structured fields
        let parsed = self.parser.parse(user_input).await?;

        // Step 2: deterministic embedding input from the parsed fields
        let row = parsed.to_row();
        let normalized = normalize_row(&row, &schema::EMBED_FIELDS);
        let text = descriptive_text(&normalized);
        debug!("Descriptive text: {text}");

        // Step 3: embed once per request
        let embedding = self.embedder.embed(&text).await?;

        // Step 4: hybrid retrieval
        let filter = build_filter(&parsed);
        let results = self
            .store
            .find_similar(&embedding, &filter, self.result_limit)
            .await?;

        if results.is_empty() {
            info!("No properties matched the given filters");
            return Ok(SearchOutcome {
                properties: Vec::new(),
                summary: Some(prompts::NO_MATCHES_SUMMARY.to_string()),
            });
        }

        // Step 5: best-effort digest; retrieved data survives a summary failure
        let summary = match self.summarizer.summarize(&results, user_input).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!("Summary generation failed, returning properties without digest: {e}");
                None
            }
        };

        Ok(SearchOutcome {
            properties: results.into_iter().map(|r| r.document).collect(),
            summary,
        })
    }

    /// User-facing advisory for a rejected query.
    pub async fn rejection_message(&self, failure: ValidationFailure, input: &str) -> String {
        self.parser.rejection_message(failure, input).await
    }
}
