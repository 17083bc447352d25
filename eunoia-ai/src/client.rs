use std::sync::Arc;

use serde_json::Value;

use crate::traits::{ChatMessage, ModelProvider};

/// One generation request as accepted by the integrations surface.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    /// When present, the provider is asked to constrain its output to this
    /// JSON structure and the response is parsed into a structured value.
    pub response_json_schema: Option<Value>,
    pub model: Option<String>,
}

/// Client for text-generation requests, layered over a [`ModelProvider`]
pub struct LlmClient {
    provider: Arc<dyn ModelProvider>,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Arc<dyn ModelProvider> {
        self.provider.clone()
    }

    /// Run a generation. With a schema the result is always a structured
    /// value (falling back to a `{raw_text, parse_error}` envelope when the
    /// provider's output cannot be parsed); without one, the raw text is
    /// returned as a JSON string.
    pub async fn invoke(&self, req: LlmRequest) -> anyhow::Result<Value> {
        let mut messages = Vec::new();
        if let Some(schema) = &req.response_json_schema {
            messages.push(ChatMessage::system(format!(
                "你是一个严谨的助手。请严格按照以下JSON结构返回结果，不要输出任何解释或多余文本：\n{}",
                serde_json::to_string(schema)?
            )));
        }
        messages.push(ChatMessage::user(req.prompt.clone()));

        let content = self.provider.chat(messages, req.model.as_deref()).await?;

        if req.response_json_schema.is_some() {
            Ok(parse_structured(&content))
        } else {
            Ok(Value::String(content))
        }
    }
}

/// Parse model output that was asked to be JSON. Tries a direct parse, then
/// the outermost `{...}` substring, then wraps the raw text in a fallback
/// envelope so callers always receive a structured object.
pub fn parse_structured(content: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(content) {
        if v.is_object() {
            return v;
        }
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            if let Ok(v) = serde_json::from_str::<Value>(&content[start..=end]) {
                if v.is_object() {
                    return v;
                }
            }
        }
    }

    serde_json::json!({
        "raw_text": content,
        "parse_error": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_object() {
        let v = parse_structured(r#"{"overall_trend": "improving"}"#);
        assert_eq!(v["overall_trend"], "improving");
        assert!(v.get("parse_error").is_none());
    }

    #[test]
    fn extracts_embedded_json_object() {
        let v = parse_structured("Here is the result:\n{\"mood\": \"calm\"}\nHope it helps!");
        assert_eq!(v["mood"], "calm");
        assert!(v.get("parse_error").is_none());
    }

    #[test]
    fn wraps_unparseable_text_in_envelope() {
        let v = parse_structured("sorry, error");
        assert_eq!(v["raw_text"], "sorry, error");
        assert_eq!(v["parse_error"], true);
    }

    #[test]
    fn non_object_json_falls_back_to_envelope() {
        let v = parse_structured("[1, 2, 3]");
        assert_eq!(v["parse_error"], true);
    }
}
