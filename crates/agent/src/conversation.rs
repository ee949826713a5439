//! Bounded conversation history

use localpilot_provider::{Message, Role};
use tracing::debug;

/// Ordered messages replayed to the model every round. Index 0 is always
/// the system prompt.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    limit: usize,
}

impl Conversation {
    /// Start with just the system prompt; keep at most `limit` messages after it
    pub fn new(system_prompt: impl Into<String>, limit: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            limit,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Keep the system prompt and the most recent `limit` messages.
    ///
    /// Tool results at the start of the kept tail have lost the assistant
    /// message that requested them, so they are dropped as well. Returns
    /// the number of messages removed.
    pub fn trim(&mut self) -> usize {
        if self.messages.len().saturating_sub(1) <= self.limit {
            return 0;
        }

        let mut start = self.messages.len() - self.limit;
        while start < self.messages.len() && self.messages[start].role == Role::Tool {
            start += 1;
        }

        let removed = start - 1;
        self.messages.drain(1..start);
        debug!(
            "trimmed {} messages, {} remain",
            removed,
            self.messages.len()
        );
        removed
    }
}
