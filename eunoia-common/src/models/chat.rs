// File: eunoia-common/src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One conversation with a persona. `messages_json` holds the ordered
/// message records; the codec exposes them as `messages` on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ChatHistory {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub style_name: Option<String>,
    #[serde(default)]
    pub style_avatar: Option<String>,
    #[serde(default)]
    pub messages_json: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A single transcript record as stored inside `messages_json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
