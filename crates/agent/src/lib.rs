//! Agent core: tool catalog, confirmation gate, bounded conversation and the
//! model/tool dispatch loop.

use thiserror::Error;

pub mod confirm;
pub mod context;
pub mod conversation;
pub mod loop_agent;
pub mod tools;

pub use confirm::{is_approval, ConfirmationGate, Console};
pub use context::ContextBuilder;
pub use conversation::Conversation;
pub use loop_agent::{AgentLoop, SessionReport, TurnReport, SKIPPED_BY_USER};
pub use tools::{ToolInvocation, ToolKind, ToolOutput, Toolbox};

/// Agent errors. Tool failures never surface here; they become tool results.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model backend error: {0}")]
    Provider(#[from] localpilot_provider::ProviderError),

    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
