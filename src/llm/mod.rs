//! Chat-model client module
//!
//! Wraps the external language model behind a narrow seam: plain completions
//! for yes/no gates and advisory messages, structured completions (JSON
//! schema response format) for the semantic verdict and field extraction.

pub mod client;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use client::LlmClient;

use crate::errors::Result;

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Seam over the external chat model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Free-form completion; returns the assistant message content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Completion constrained to a JSON schema response format; returns the
    /// raw JSON text of the assistant message.
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        response_format: &Value,
    ) -> Result<String>;
}
