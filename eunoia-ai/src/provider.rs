use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::models::ProviderConfig;
use crate::traits::{ChatMessage, ModelProvider};

/// Zhipu open-platform provider (OpenAI-shaped chat-completions API)
pub struct ZhipuProvider {
    config: ProviderConfig,
    client: Client,
}

impl ZhipuProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for ZhipuProvider {
    fn name(&self) -> &str {
        "zhipu"
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
    ) -> anyhow::Result<String> {
        let api_base = self.config.api_base.clone().unwrap_or_else(|| {
            "https://open.bigmodel.cn/api/paas/v4".to_string()
        });
        let used_model = model.unwrap_or(&self.config.default_model);

        let formatted_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role,
                    "content": msg.content,
                })
            })
            .collect();

        tracing::debug!("LLM chat request: model={} messages={}", used_model, formatted_messages.len());

        let response = self.client
            .post(format!("{}/chat/completions", api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&json!({
                "model": used_model,
                "messages": formatted_messages,
            }))
            .send()
            .await?;

        let status = response.status();
        let data = response.json::<serde_json::Value>().await?;

        if !status.is_success() {
            let msg = data["error"]["message"]
                .as_str()
                .or_else(|| data["msg"].as_str())
                .unwrap_or("LLM request failed");
            return Err(anyhow::anyhow!("{}", msg));
        }

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format"))?
            .to_string();

        Ok(content)
    }
}
