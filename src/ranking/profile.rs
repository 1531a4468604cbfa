//! Assembles a free-text profile by letting the completion collaborator
//! drive the tool-calling client.
//!
//! The flow is: list the available tools, let the model pick calls, execute
//! each call, feed the results back, and request the final profile summary.
//! A failed tool call is logged and the profile is built without its data; a
//! completion that never requests tools degrades to the conversation alone.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::services::{ChatMessage, CompletionOutcome, CompletionService, ToolClient};
use crate::types::RagtreeError;

const PROFILE_SYSTEM_PROMPT: &str = "\
You are a user profile builder. Use the provided tools to gather the user's \
activity and preferences, then compose their profile.";

const PROFILE_SUMMARY_PROMPT: &str = "\
Based on the gathered data, write the user's profile as plain text covering: \
demographics where available, recent activity and explicit preferences \
(viewed and purchased items, liked and disliked categories, search history), \
and inferred interests, style, and spending habits.";

/// Builds ranker-ready profiles for an owning entity.
pub struct ProfileBuilder {
    completion: Arc<dyn CompletionService>,
    tools: Arc<dyn ToolClient>,
}

impl ProfileBuilder {
    /// Builder over the given collaborators.
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionService>, tools: Arc<dyn ToolClient>) -> Self {
        Self { completion, tools }
    }

    /// Assembles a free-text profile for `user_id`.
    pub async fn build_profile(&self, user_id: &str) -> Result<String, RagtreeError> {
        let specs = self.tools.list_tools().await?;
        debug!(user_id, tool_count = specs.len(), "building profile");

        let mut messages = vec![
            ChatMessage::system(PROFILE_SYSTEM_PROMPT),
            ChatMessage::user(format!("User id: {user_id}")),
        ];

        match self.completion.complete(&messages, &specs).await? {
            // No tool calls requested: the conversation is all we have.
            CompletionOutcome::Text(text) => Ok(text),
            CompletionOutcome::ToolCalls(calls) => {
                for call in calls {
                    match self.tools.call_tool(&call.name, call.arguments.clone()).await {
                        Ok(result) => {
                            messages.push(ChatMessage::tool(format!("{}: {result}", call.name)));
                        }
                        Err(err) => {
                            warn!(
                                tool = %call.name,
                                error = %err,
                                "tool call failed; building profile without its data"
                            );
                        }
                    }
                }
                messages.push(ChatMessage::user(PROFILE_SUMMARY_PROMPT));
                match self.completion.complete(&messages, &[]).await? {
                    CompletionOutcome::Text(text) => Ok(text),
                    CompletionOutcome::ToolCalls(_) => Err(RagtreeError::Completion(
                        "profile summary returned tool calls instead of text".to_string(),
                    )),
                }
            }
        }
    }
}
