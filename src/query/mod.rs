//! Query understanding: validation gates, field extraction, filter building
//!
//! A raw query passes through three gates before any retrieval work happens,
//! ordered cheapest first so invalid input never triggers a billable call:
//!
//! 1. Language gate - local detection, English only, no model call.
//! 2. Format gate - one chat call: is this a natural-language real estate
//!    question at all?
//! 3. Semantic gate - one structured chat call: ambiguity, domain relevance,
//!    and complexity verdict.
//!
//! Only then is the structured field extraction performed. The extraction
//! model reports unspecified fields as `"none"`; this module never fabricates
//! a value the model did not commit to.

pub mod filter;

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub use filter::build_filter;
pub use filter::canonicalize;
pub use filter::FilterClause;
pub use filter::FilterExpression;

use crate::errors::Result;
use crate::errors::ValidationFailure;
use crate::llm::prompts;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::models::ParsedQuery;

/// Semantic gate verdict from the chat model.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QueryVerdict {
    pub ambiguous: bool,
    pub real_estate_related: bool,
    pub unsupported_complexity: bool,
}

/// Validates natural-language queries and extracts structured fields.
pub struct QueryParser {
    chat: Arc<dyn ChatModel>,
}

impl QueryParser {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Local English-language check. Runs before everything else because it
    /// is free.
    pub fn is_english(input: &str) -> bool {
        whatlang::detect(input).is_some_and(|info| info.lang() == whatlang::Lang::Eng)
    }

    /// Run all gates, then extract structured fields.
    ///
    /// # Errors
    /// - `Validation` for any gate failure (short-circuits, in gate order)
    /// - `Llm` for chat transport or malformed-verdict failures
    /// - `FilterBuild` when the extraction carries an unknown operator
    pub async fn parse(&self, input: &str) -> Result<ParsedQuery> {
        if !Self::is_english(input) {
            info!("Rejecting non-English query");
            return Err(ValidationFailure::NotEnglish.into());
        }

        if !self.validate_format(input).await? {
            info!("Rejecting query that is not a natural-language question");
            return Err(ValidationFailure::InvalidFormat.into());
        }

        let verdict = self.validate_semantics(input).await?;
        if verdict.ambiguous {
            info!("Rejecting ambiguous query");
            return Err(ValidationFailure::Ambiguous.into());
        }
        if !verdict.real_estate_related {
            info!("Rejecting query outside the real estate domain");
            return Err(ValidationFailure::NotRealEstate.into());
        }
        if verdict.unsupported_complexity {
            info!("Rejecting query with unsupported complexity");
            return Err(ValidationFailure::UnsupportedComplexity.into());
        }

        self.extract(input).await
    }

    /// Format gate: plain yes/no completion.
    async fn validate_format(&self, input: &str) -> Result<bool> {
        let messages = [
            ChatMessage::system(prompts::FORMAT_GATE),
            ChatMessage::user(input),
        ];
        let answer = self.chat.complete(&messages).await?;
        Ok(answer.trim().eq_ignore_ascii_case("true"))
    }

    /// Semantic gate: structured verdict.
    async fn validate_semantics(&self, input: &str) -> Result<QueryVerdict> {
        let messages = [
            ChatMessage::system(prompts::SEMANTIC_GATE),
            ChatMessage::user(input),
        ];
        let raw = self
            .chat
            .complete_structured(&messages, &prompts::verdict_response_format())
            .await?;

        let verdict: QueryVerdict = serde_json::from_str(&raw).map_err(|e| {
            crate::EstateRagError::Llm(format!("malformed verdict from chat model: {e}"))
        })?;
        debug!(
            "Semantic verdict: ambiguous={} real_estate={} complexity={}",
            verdict.ambiguous, verdict.real_estate_related, verdict.unsupported_complexity
        );
        Ok(verdict)
    }

    /// Structured field extraction into the property schema.
    async fn extract(&self, input: &str) -> Result<ParsedQuery> {
        let messages = [
            ChatMessage::system(prompts::EXTRACTION),
            ChatMessage::user(input),
        ];
        let raw = self
            .chat
            .complete_structured(&messages, &prompts::property_response_format())
            .await?;

        let fields: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            crate::EstateRagError::Llm(format!("malformed extraction from chat model: {e}"))
        })?;
        ParsedQuery::from_json(&fields)
    }

    /// Generate a user-facing advisory for a rejected query. The chat call
    /// is best-effort: a static fallback covers the failure case so the user
    /// always gets guidance.
    pub async fn rejection_message(&self, failure: ValidationFailure, input: &str) -> String {
        let (advisory_prompt, fallback) = match failure {
            ValidationFailure::NotEnglish => {
                // No model call for non-English input either - the advisory
                // has to be in English anyway.
                return prompts::NOT_ENGLISH_FALLBACK.to_string();
            }
            ValidationFailure::InvalidFormat => {
                (prompts::INVALID_FORMAT_ADVISORY, prompts::INVALID_FORMAT_FALLBACK)
            }
            ValidationFailure::Ambiguous => {
                (prompts::AMBIGUOUS_ADVISORY, prompts::AMBIGUOUS_FALLBACK)
            }
            ValidationFailure::NotRealEstate => (
                prompts::NON_REAL_ESTATE_ADVISORY,
                prompts::NON_REAL_ESTATE_FALLBACK,
            ),
            ValidationFailure::UnsupportedComplexity => {
                (prompts::COMPLEXITY_ADVISORY, prompts::COMPLEXITY_FALLBACK)
            }
        };

        let messages = [
            ChatMessage::system(advisory_prompt),
            ChatMessage::user(input),
        ];
        match self.chat.complete(&messages).await {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to generate advisory message: {e}");
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_gate_accepts_english() {
        assert!(QueryParser::is_english(
            "Show me properties listed in San Francisco under $700,000."
        ));
    }

    #[test]
    fn test_language_gate_rejects_spanish() {
        assert!(!QueryParser::is_english(
            "¿Qué propiedades hay disponibles en Atlanta con tres dormitorios?"
        ));
    }
}
