use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single message in a chat-completions conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Trait implemented by text-generation providers
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Run a chat completion and return the assistant's text content.
    /// `model` overrides the provider's default model when given.
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
    ) -> anyhow::Result<String>;
}
