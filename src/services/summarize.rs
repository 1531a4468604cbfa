//! Summarization wrapper around the completion collaborator.
//!
//! The ingestion pipeline routes oversized paragraphs through here before
//! embedding. The prompt pins two requirements: the summary stays in the
//! input's language, and the output is the plain summary text with no
//! framing or formatting.

use std::sync::Arc;

use super::{ChatMessage, CompletionOutcome, CompletionService};
use crate::types::RagtreeError;

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a content summarization assistant.

Read the provided content and produce a direct, accurate summary of its \
essential points. The summary must be written in exactly the same language \
as the input content, mirroring its tone and style.

Output only the summary itself, as plain text: no titles, no markdown, no \
preamble, and no commentary.";

/// Completion-backed text summarizer.
#[derive(Clone)]
pub struct Summarizer {
    completion: Arc<dyn CompletionService>,
}

impl Summarizer {
    /// Wraps the given completion collaborator.
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Summarizes `content` into plain text.
    pub async fn summarize(&self, content: &str) -> Result<String, RagtreeError> {
        let messages = [
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(content),
        ];
        match self.completion.complete(&messages, &[]).await? {
            CompletionOutcome::Text(text) => Ok(text),
            CompletionOutcome::ToolCalls(_) => Err(RagtreeError::Completion(
                "summarizer received tool calls instead of text".to_string(),
            )),
        }
    }
}
