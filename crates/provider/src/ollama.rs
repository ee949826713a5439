//! Ollama backend
//!
//! Speaks the `/api/chat` protocol of a locally hosted Ollama server, with
//! tool calling and separate reasoning output.

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "qwen3:0.6b";

/// Ollama chat backend
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>, default_model: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            base_url,
            default_model: default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, params: &ChatParams) -> Result<serde_json::Value> {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let mut body = json!({
            "model": model,
            "messages": serde_json::to_value(&params.messages)?,
            "think": params.think,
            "stream": false,
        });

        if !params.tools.is_empty() {
            body["tools"] = serde_json::to_value(&params.tools)?;
        }

        if let Some(temperature) = params.temperature {
            body["options"] = json!({ "temperature": temperature });
        }

        Ok(body)
    }

    fn parse_response(&self, mut json: serde_json::Value) -> Result<ChatResponse> {
        let mut raw = json
            .get_mut("message")
            .filter(|m| m.is_object())
            .map(serde_json::Value::take)
            .ok_or(ProviderError::InvalidResponse)?;

        // Some servers send arguments as an encoded JSON string
        if let Some(calls) = raw
            .get_mut("tool_calls")
            .and_then(serde_json::Value::as_array_mut)
        {
            for call in calls {
                let Some(arguments) = call
                    .get_mut("function")
                    .and_then(|f| f.get_mut("arguments"))
                else {
                    continue;
                };
                if let Some(decoded) = arguments
                    .as_str()
                    .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
                {
                    *arguments = decoded;
                }
            }
        }

        let message: Message = serde_json::from_value(raw)?;
        let done_reason = json["done_reason"].as_str().unwrap_or("stop").to_string();
        let usage = Usage {
            prompt_tokens: token_count(&json["prompt_eval_count"]),
            completion_tokens: token_count(&json["eval_count"]),
        };

        Ok(ChatResponse {
            message,
            done_reason,
            usage,
        })
    }

    /// Names of the models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(error_message(status, &text)));
        }

        let json: serde_json::Value = serde_json::from_str(&text)?;
        Ok(json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Counts above `u32::MAX` saturate instead of wrapping
fn token_count(value: &serde_json::Value) -> u32 {
    value
        .as_u64()
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, body.trim())
            }
        })
}

#[async_trait::async_trait]
impl Provider for OllamaProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }
        trace!("posting chat request to {}", self.base_url);

        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request(&params)?;

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(error_message(status, &text)));
        }

        let json: serde_json::Value = serde_json::from_str(&text)?;
        let response = self.parse_response(json)?;

        debug!(
            "model replied: {} tool calls, {} completion tokens",
            response.tool_calls().len(),
            response.usage.completion_tokens
        );

        Ok(response)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}
