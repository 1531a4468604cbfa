//! Collaborator contracts: embeddings, completions, and tool calling.
//!
//! The core never talks to a provider directly — it goes through these
//! traits, which makes every pipeline deterministic under test. Concrete
//! network-backed implementations live in the embedding application, not in
//! this crate. [`MockEmbedding`] ships here because the tests of every
//! downstream module need it.

pub mod summarize;

pub use summarize::Summarizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::RagtreeError;

/// A chat message exchanged with the completion collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    ///
    /// Use the constants on [`ChatMessage`] for standardized values.
    pub role: String,
    /// The text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// Assistant response message role.
    pub const ASSISTANT: &'static str = "assistant";
    /// System prompt or instruction message role.
    pub const SYSTEM: &'static str = "system";
    /// Tool result message role.
    pub const TOOL: &'static str = "tool";

    /// Creates a message with the specified role and content.
    #[must_use]
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Creates a tool-result message.
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Self::TOOL, content)
    }
}

/// Description of a callable tool exposed by the tool-calling client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema of the tool's arguments.
    pub input_schema: serde_json::Value,
}

/// A tool invocation requested by the completion collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments for the invocation.
    pub arguments: serde_json::Value,
}

/// Outcome of a completion request.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    /// Final text from the model.
    Text(String),
    /// The model requested tool invocations instead of answering.
    ToolCalls(Vec<ToolCall>),
}

/// Text-embedding collaborator.
///
/// Identical text must yield a stable vector, so round trips are testable.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagtreeError>;

    /// Embeds a batch of texts, preserving order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagtreeError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Text-completion collaborator used for term extraction, summarization,
/// and profile prompts. The core needs only the request/outcome contract,
/// not conversation state.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Runs a completion over the given messages; `tools` may be empty.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CompletionOutcome, RagtreeError>;
}

/// Tool-calling protocol client.
#[async_trait]
pub trait ToolClient: Send + Sync {
    /// Lists the tools the remote side exposes.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, RagtreeError>;

    /// Invokes a tool and returns its result content.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, RagtreeError>;
}

/// Deterministic embedding provider for tests and offline runs.
///
/// Vectors are derived from a hash of the input text: identical text yields
/// an identical unit-length vector, different texts diverge.
#[derive(Clone, Debug)]
pub struct MockEmbedding {
    dims: usize,
}

impl MockEmbedding {
    /// Provider with a small default dimensionality.
    #[must_use]
    pub fn new() -> Self {
        Self { dims: 16 }
    }

    /// Provider emitting vectors of the given dimensionality.
    #[must_use]
    pub fn with_dims(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        // FNV-1a seed, xorshift fill.
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.as_bytes() {
            state ^= u64::from(*byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        let mut vector = Vec::with_capacity(self.dims);
        for _ in 0..self.dims {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 11) as f32 / (1u64 << 53) as f32;
            vector.push(unit * 2.0 - 1.0);
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagtreeError> {
        Ok(self.vector_for(text))
    }
}
