// File: eunoia-common/src/models/community.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feed post. `tags_json`, `liked_by_json`, and `shared_style_data_json`
/// are serialized blob columns; the codec exposes them on the wire as
/// `tags`, `liked_by`, and `shared_style_data`.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Post {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags_json: Option<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub liked_by_json: Option<String>,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub shared_style_id: Option<i64>,
    #[serde(default)]
    pub shared_style_data_json: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    "Treehole".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Comment {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Bookmark join row. Uniqueness per (created_by, post_id) is a client
/// convention, not a constraint.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Favorite {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub post_author_email: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Feed event addressed to `recipient_email`; `type` is one of
/// `like` | `favorite` | `comment`.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Notification {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default = "default_notification_type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub actor_email: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub comment_content: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_notification_type() -> String {
    "like".to_string()
}
