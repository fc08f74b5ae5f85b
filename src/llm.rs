use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use reqwest::Client;
use crate::config::Config;
use crate::error::{Result, AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Raw body of a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply(pub serde_json::Value);

impl ChatReply {
    /// Text of the first content block, if the reply has one.
    pub fn text(&self) -> Option<&str> {
        self.0["message"]["content"][0]["text"].as_str()
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Prompt in, reply out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatReply>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

/// Cohere v2 chat endpoint.
pub struct CohereClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl CohereClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.cohere_api_key, &config.model, &config.chat_url)
    }
}

impl fmt::Debug for CohereClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl ChatModel for CohereClient {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatReply> {
        let body = ChatRequest {
            model: &self.model,
            messages,
        };

        tracing::debug!(target: "llm_request", model = %self.model, "sending chat request");

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("{}: {}", status, text)));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Invalid response format from LLM: {}", e)))?;

        Ok(ChatReply(json))
    }
}
