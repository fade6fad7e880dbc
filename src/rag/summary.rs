//! Natural-language digest of a retrieved property set

use std::sync::Arc;

use tracing::debug;

use crate::errors::EstateRagError;
use crate::errors::Result;
use crate::llm::prompts;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::models::ScoredDocument;

/// Generates a markdown digest of retrieved properties, answering the user's
/// original question.
pub struct Summarizer {
    chat: Arc<dyn ChatModel>,
}

impl Summarizer {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Summarize the retrieved set in the context of the original query.
    ///
    /// # Errors
    /// Chat transport and serialization failures surface as `Summary`; the
    /// caller decides whether to degrade (the serving path returns the
    /// properties without a digest rather than failing the request).
    pub async fn summarize(
        &self,
        results: &[ScoredDocument],
        original_query: &str,
    ) -> Result<String> {
        debug!("Summarizing {} retrieved properties", results.len());

        let documents: Vec<&serde_json::Value> = results.iter().map(|r| &r.document).collect();
        let payload = serde_json::to_string(&documents)?;

        let messages = [
            ChatMessage::system(prompts::SUMMARY_INSTRUCTIONS),
            ChatMessage::user(original_query),
            ChatMessage::user(payload),
        ];

        self.chat
            .complete(&messages)
            .await
            .map_err(|e| EstateRagError::Summary(e.to_string()))
    }
}
