#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use ragtree::services::{
    ChatMessage, CompletionOutcome, CompletionService, EmbeddingService, ToolClient, ToolSpec,
};
use ragtree::types::RagtreeError;

/// Installs a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Completion collaborator that replays a fixed script of outcomes and
/// records every request it receives.
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<CompletionOutcome>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn new(outcomes: Vec<CompletionOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<CompletionOutcome, RagtreeError> {
        self.calls.lock().push(messages.to_vec());
        self.script
            .lock()
            .pop_front()
            .ok_or_else(|| RagtreeError::Completion("completion script exhausted".to_string()))
    }
}

/// Embedding collaborator that fails every call.
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingService for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, RagtreeError> {
        Err(RagtreeError::Embedding("embedding backend down".to_string()))
    }
}

/// Tool client exposing a fixed tool set with canned results.
pub struct StaticToolClient {
    specs: Vec<ToolSpec>,
    results: Mutex<VecDeque<Result<serde_json::Value, RagtreeError>>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl StaticToolClient {
    pub fn new(
        specs: Vec<ToolSpec>,
        results: Vec<Result<serde_json::Value, RagtreeError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            specs,
            results: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded_calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ToolClient for StaticToolClient {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, RagtreeError> {
        Ok(self.specs.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, RagtreeError> {
        self.calls.lock().push((name.to_string(), arguments));
        self.results.lock().pop_front().unwrap_or_else(|| {
            Err(RagtreeError::ToolCall {
                name: name.to_string(),
                message: "tool script exhausted".to_string(),
            })
        })
    }
}
