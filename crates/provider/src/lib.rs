//! Model service boundary
//!
//! Message, tool-call and tool-descriptor types shared by the agent, and the
//! [`Provider`] trait the agent loop talks to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use thiserror::Error;

pub mod ollama;

pub use ollama::OllamaProvider;

/// Model backend errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to model backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed JSON from model backend: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model backend rejected request: {0}")]
    Api(String),

    #[error("model backend returned no message")]
    InvalidResponse,

    #[error("no model backend configured")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Author of a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation entry, in the shape the backend expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Reasoning text emitted separately when thinking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on tool results: which tool produced this content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            thinking: None,
            tool_calls: None,
            tool_name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(name: impl Into<String>, result: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, result);
        msg.tool_name = Some(name.into());
        msg
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = if calls.is_empty() { None } else { Some(calls) };
        self
    }

    pub fn with_thinking(mut self, thinking: impl Into<String>) -> Self {
        self.thinking = Some(thinking.into());
        self
    }

    /// Tool calls requested by this message, if any
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &Value {
        &self.function.arguments
    }
}

/// Function name and argument mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDef,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Function schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Token accounting reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A single model reply
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub done_reason: String,
    pub usage: Usage,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.message.tool_calls().is_empty()
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls()
    }

    /// Answer text, `None` when the model produced only tool calls
    pub fn content(&self) -> Option<&str> {
        Some(self.message.content.as_str()).filter(|c| !c.trim().is_empty())
    }

    pub fn thinking(&self) -> Option<&str> {
        self.message
            .thinking
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            done_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }

    pub fn tool_request(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            message: Message::assistant(content).with_tool_calls(calls),
            done_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }
}

/// Request parameters
#[derive(Debug, Clone, Default)]
pub struct ChatParams {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub think: bool,
    pub temperature: Option<f32>,
}

/// A chat-capable model backend
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse>;
    fn default_model(&self) -> String;
    fn is_configured(&self) -> bool;
}

/// Build a JSON schema object whose properties are all strings
pub fn object_schema(properties: &[(&str, &str, bool)]) -> Value {
    let mut props = serde_json::Map::new();
    let mut required = Vec::new();

    for (name, description, is_required) in properties {
        props.insert(
            name.to_string(),
            serde_json::json!({
                "type": "string",
                "description": description
            }),
        );
        if *is_required {
            required.push(name.to_string());
        }
    }

    serde_json::json!({
        "type": "object",
        "properties": props,
        "required": required
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Api("model 'nope' not found".to_string());
        assert_eq!(
            err.to_string(),
            "model backend rejected request: model 'nope' not found"
        );
        assert_eq!(
            ProviderError::InvalidResponse.to_string(),
            "model backend returned no message"
        );
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::system("be brief");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content, "be brief");
        assert!(msg.tool_calls.is_none());
        assert!(msg.tool_name.is_none());

        let msg = Message::tool("read_file", "hello");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_name.as_deref(), Some("read_file"));
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_empty_tool_calls_collapse_to_none() {
        let msg = Message::assistant("done").with_tool_calls(vec![]);
        assert!(msg.tool_calls.is_none());
        assert!(msg.tool_calls().is_empty());
    }

    #[test]
    fn test_message_serialization_skips_unset_fields() {
        let json_str = serde_json::to_string(&Message::user("Hello")).unwrap();
        assert_eq!(json_str, r#"{"role":"user","content":"Hello"}"#);
    }

    #[test]
    fn test_tool_message_serialization() {
        let value = serde_json::to_value(Message::tool("git_status", "clean")).unwrap();
        assert_eq!(
            value,
            json!({"role": "tool", "content": "clean", "tool_name": "git_status"})
        );
    }

    #[test]
    fn test_assistant_message_deserialization() {
        let raw = json!({
            "role": "assistant",
            "content": "",
            "thinking": "I should list files",
            "tool_calls": [
                {"function": {"name": "list_files_in_directory", "arguments": {"directory": "."}}}
            ]
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.thinking.as_deref(), Some("I should list files"));
        assert_eq!(msg.tool_calls().len(), 1);
        assert_eq!(msg.tool_calls()[0].name(), "list_files_in_directory");
        assert_eq!(msg.tool_calls()[0].arguments()["directory"], ".");
    }

    #[test]
    fn test_chat_response_content_filters_blank() {
        let response = ChatResponse::tool_request("  ", vec![ToolCall::new("git_diff", json!({}))]);
        assert!(response.has_tool_calls());
        assert!(response.content().is_none());
        assert!(response.thinking().is_none());

        let response = ChatResponse::text("All done.");
        assert!(!response.has_tool_calls());
        assert_eq!(response.content(), Some("All done."));
    }

    #[test]
    fn test_tool_serialization() {
        let tool = Tool::new("read_file", "Read a file", json!({}));
        let json_str = serde_json::to_string(&tool).unwrap();
        assert!(json_str.contains("\"type\":\"function\""));
        assert!(json_str.contains("\"name\":\"read_file\""));
    }

    #[test]
    fn test_object_schema_mixed_required() {
        let schema = object_schema(&[
            ("file_path", "Path of the file", true),
            ("directory", "Directory to list", false),
        ]);

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["file_path"]["type"], "string");
        assert_eq!(
            schema["properties"]["directory"]["description"],
            "Directory to list"
        );
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required, &vec![json!("file_path")]);
    }

    #[test]
    fn test_object_schema_empty() {
        let schema = object_schema(&[]);
        assert!(schema["properties"].as_object().unwrap().is_empty());
        assert!(schema["required"].as_array().unwrap().is_empty());
    }
}
