// File: eunoia-common/src/models/entity.rs

use std::fmt;
use serde::{Deserialize, Serialize};

/// Visibility policy applied when listing an entity type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Scope {
    /// Visible to every authenticated caller.
    Unscoped,
    /// Rows are filtered to `created_by = caller`.
    ByCreator,
    /// Rows are filtered to `recipient_email = caller`.
    ByRecipient,
}

/// The closed set of entity types served by the generic gateway.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Post,
    Comment,
    Notification,
    Favorite,
    ChatHistory,
    ChatStyle,
    EmotionReport,
    TrendAnalysis,
    Course,
}

impl EntityKind {
    /// Resolve a wire-side entity name. Unknown names are a not-found
    /// condition at the gateway, never a silent no-op.
    pub fn from_name(name: &str) -> Option<EntityKind> {
        match name {
            "Post" => Some(EntityKind::Post),
            "Comment" => Some(EntityKind::Comment),
            "Notification" => Some(EntityKind::Notification),
            "Favorite" => Some(EntityKind::Favorite),
            "ChatHistory" => Some(EntityKind::ChatHistory),
            "ChatStyle" => Some(EntityKind::ChatStyle),
            "EmotionReport" => Some(EntityKind::EmotionReport),
            "TrendAnalysis" => Some(EntityKind::TrendAnalysis),
            "Course" => Some(EntityKind::Course),
            _ => None,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Post => "posts",
            EntityKind::Comment => "comments",
            EntityKind::Notification => "notifications",
            EntityKind::Favorite => "favorites",
            EntityKind::ChatHistory => "chat_histories",
            EntityKind::ChatStyle => "chat_styles",
            EntityKind::EmotionReport => "emotion_reports",
            EntityKind::TrendAnalysis => "trend_analyses",
            EntityKind::Course => "courses",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            EntityKind::Favorite
            | EntityKind::ChatHistory
            | EntityKind::ChatStyle
            | EntityKind::EmotionReport
            | EntityKind::TrendAnalysis => Scope::ByCreator,
            EntityKind::Notification => Scope::ByRecipient,
            EntityKind::Post | EntityKind::Comment | EntityKind::Course => Scope::Unscoped,
        }
    }

    /// Whether create stamps `created_by` from the caller when the payload
    /// omits it. Courses and notifications carry no creator column.
    pub fn stamps_creator(&self) -> bool {
        !matches!(self, EntityKind::Notification | EntityKind::Course)
    }

    /// Storage-side columns accepted as `order=` fields for this kind.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Post => &[
                "id", "title", "content", "category", "image_url", "tags_json",
                "likes_count", "liked_by_json", "comments_count", "shared_style_id",
                "shared_style_data_json", "created_by", "created_at", "updated_at",
            ],
            EntityKind::Comment => &[
                "id", "post_id", "author_name", "content", "created_by",
                "created_at", "updated_at",
            ],
            EntityKind::Notification => &[
                "id", "type", "post_id", "post_title", "actor_email", "actor_name",
                "recipient_email", "comment_content", "is_read", "created_at",
                "updated_at",
            ],
            EntityKind::Favorite => &[
                "id", "post_id", "post_title", "post_author_email", "created_by",
                "created_at", "updated_at",
            ],
            EntityKind::ChatHistory => &[
                "id", "title", "style_name", "style_avatar", "messages_json",
                "last_message_at", "created_by", "created_at", "updated_at",
            ],
            EntityKind::ChatStyle => &[
                "id", "name", "avatar", "personality", "background",
                "dialogue_style", "is_default", "is_imported", "original_style_id",
                "original_author_email", "original_author_name",
                "is_deleted_by_author", "created_by", "created_at", "updated_at",
            ],
            EntityKind::EmotionReport => &[
                "id", "title", "selected_chats_json", "status",
                "analysis_result_json", "is_viewed", "analyzed_at", "created_by",
                "created_at", "updated_at",
            ],
            EntityKind::TrendAnalysis => &[
                "id", "title", "selected_reports_json", "status",
                "trend_result_json", "analyzed_at", "created_by", "created_at",
                "updated_at",
            ],
            EntityKind::Course => &[
                "id", "cover_image", "title", "partner_name", "description",
                "total_lessons", "plus_trial_lessons", "free_trial_lessons",
                "price", "plus_discount", "is_featured", "created_at", "updated_at",
            ],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Post => "Post",
            EntityKind::Comment => "Comment",
            EntityKind::Notification => "Notification",
            EntityKind::Favorite => "Favorite",
            EntityKind::ChatHistory => "ChatHistory",
            EntityKind::ChatStyle => "ChatStyle",
            EntityKind::EmotionReport => "EmotionReport",
            EntityKind::TrendAnalysis => "TrendAnalysis",
            EntityKind::Course => "Course",
        };
        write!(f, "{}", name)
    }
}

/// Parsed list parameters. `order` and `limit` arrive from callers that may
/// serialize missing values as the literal strings "undefined"/"null"; those
/// are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Column to sort by, with direction.
    pub order: Option<(String, SortDirection)>,
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
    /// Caller identity used for scoped entity kinds.
    pub scope_email: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl ListQuery {
    /// Defensive parsing of raw `order`/`limit` query strings; a leading `-`
    /// on the order field means descending.
    pub fn from_raw(order: Option<&str>, limit: Option<&str>) -> Self {
        let order = order.and_then(present).map(|raw| {
            if let Some(field) = raw.strip_prefix('-') {
                (field.to_string(), SortDirection::Desc)
            } else {
                (raw.to_string(), SortDirection::Asc)
            }
        });
        let limit = limit.and_then(present).and_then(|s| s.parse::<i64>().ok());
        ListQuery { order, limit, scope_email: None }
    }
}

fn present(s: &str) -> Option<&str> {
    match s {
        "" | "undefined" | "null" => None,
        other => Some(other),
    }
}
