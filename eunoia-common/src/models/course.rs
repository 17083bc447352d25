// File: eunoia-common/src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static marketplace catalog entry. Trial lesson counts differ by tier and
/// `plus_discount` is a multiplicative price factor for Plus members.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Course {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub title: String,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_lessons: i64,
    #[serde(default)]
    pub plus_trial_lessons: i64,
    #[serde(default)]
    pub free_trial_lessons: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub plus_discount: f64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}
