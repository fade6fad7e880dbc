//! Shared test doubles for the external-service seams
//!
//! Scripted and counting fakes stand in for the chat model, the embedding
//! provider, and the store, so pipeline tests can assert on call counts and
//! batch shapes without touching the network.

use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::embeddings::Embedder;
use crate::errors::EstateRagError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::models::ScoredDocument;
use crate::query::FilterExpression;
use crate::store::PropertyStore;

/// Chat model fake that replays a fixed script of responses in order.
/// `Err` entries simulate a failed model call.
pub struct ScriptedChat {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
}

impl ScriptedChat {
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    fn next(&self) -> Result<String> {
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(EstateRagError::Llm(message)),
            None => Err(EstateRagError::Llm(
                "scripted chat exhausted: unexpected call".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.next()
    }

    async fn complete_structured(
        &self,
        _messages: &[ChatMessage],
        _response_format: &Value,
    ) -> Result<String> {
        self.next()
    }
}

/// Embedder fake that counts calls and can fail on a marked input.
pub struct CountingEmbedder {
    calls: AtomicUsize,
    dimension: usize,
    fail_marker: Option<String>,
}

impl CountingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            dimension,
            fail_marker: None,
        }
    }

    /// Fail any embed call whose input contains `marker`.
    pub fn failing_on(dimension: usize, marker: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            dimension,
            fail_marker: Some(marker.into()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(EstateRagError::Embedding(format!(
                    "simulated failure for input containing {marker:?}"
                )));
            }
        }
        Ok(vec![0.1; self.dimension])
    }
}

/// Store fake that returns canned find results and records insert batches.
pub struct RecordingStore {
    find_results: Vec<ScoredDocument>,
    pub inserted_batches: Mutex<Vec<Vec<Value>>>,
    fail_insert_at: Option<usize>,
}

impl RecordingStore {
    pub fn returning(find_results: Vec<ScoredDocument>) -> Self {
        Self {
            find_results,
            inserted_batches: Mutex::new(Vec::new()),
            fail_insert_at: None,
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// Fail the insert call with the given zero-based index.
    pub fn failing_insert_at(mut self, index: usize) -> Self {
        self.fail_insert_at = Some(index);
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.inserted_batches
            .lock()
            .unwrap()
            .iter()
            .map(Vec::len)
            .collect()
    }
}

#[async_trait]
impl PropertyStore for RecordingStore {
    async fn find_similar(
        &self,
        _embedding: &[f32],
        _filter: &FilterExpression,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        Ok(self.find_results.iter().take(limit).cloned().collect())
    }

    async fn insert_many(&self, documents: Vec<Value>) -> Result<usize> {
        let mut batches = self.inserted_batches.lock().unwrap();
        if self.fail_insert_at == Some(batches.len()) {
            batches.push(Vec::new()); // keep indices aligned with attempts
            return Err(EstateRagError::Retrieval(
                "simulated insert failure".to_string(),
            ));
        }
        let count = documents.len();
        batches.push(documents);
        Ok(count)
    }
}
