// File: eunoia-common/src/models/style.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An AI persona. Originals have `is_imported = false`; imported copies
/// carry a back-reference to the original plus an author display snapshot,
/// and are flagged `is_deleted_by_author` when the original is removed.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ChatStyle {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub dialogue_style: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_imported: bool,
    #[serde(default)]
    pub original_style_id: Option<i64>,
    #[serde(default)]
    pub original_author_email: Option<String>,
    #[serde(default)]
    pub original_author_name: Option<String>,
    #[serde(default)]
    pub is_deleted_by_author: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Status-check projection returned to any authenticated caller. Never
/// carries the persona's personality/background content.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StyleStatus {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted_by_author: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_imported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_accessible: Option<bool>,
}

impl StyleStatus {
    pub fn missing() -> Self {
        Self {
            exists: false,
            is_deleted_by_author: None,
            is_imported: None,
            author_email: None,
            name: None,
            is_accessible: None,
        }
    }
}
