use serde::{Deserialize, Serialize};

/// Configuration for the text-generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for API requests
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Default model to use with this provider
    pub default_model: String,
}

impl ProviderConfig {
    /// Read provider settings from the environment, with development
    /// defaults for everything except the API key.
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("ZHIPU_API_BASE").ok(),
            api_key: std::env::var("ZHIPU_API_KEY").unwrap_or_default(),
            default_model: std::env::var("ZHIPU_MODEL")
                .unwrap_or_else(|_| "glm-4.5-flash".to_string()),
        }
    }
}
