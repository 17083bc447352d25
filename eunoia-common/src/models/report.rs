// File: eunoia-common/src/models/report.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an analysis record. Created `pending`/`analyzing`, then the
/// orchestrator moves it exactly once to `completed` or `failed`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(f, "pending"),
            AnalysisStatus::Analyzing => write!(f, "analyzing"),
            AnalysisStatus::Completed => write!(f, "completed"),
            AnalysisStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AnalysisStatus::Pending),
            "analyzing" => Ok(AnalysisStatus::Analyzing),
            "completed" => Ok(AnalysisStatus::Completed),
            "failed" => Ok(AnalysisStatus::Failed),
            _ => Err(format!("Unknown analysis status: {}", s)),
        }
    }
}

impl Default for AnalysisStatus {
    fn default() -> Self {
        AnalysisStatus::Pending
    }
}

/// Emotion analysis over a selection of chat histories. `selected_chats_json`
/// and `analysis_result_json` are blob columns surfaced on the wire as
/// `selected_chats` / `analysis_result`.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct EmotionReport {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selected_chats_json: Option<String>,
    #[serde(default)]
    pub status: AnalysisStatus,
    #[serde(default)]
    pub analysis_result_json: Option<String>,
    #[serde(default)]
    pub is_viewed: bool,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Trend synthesis over a selection of completed emotion reports.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct TrendAnalysis {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selected_reports_json: Option<String>,
    #[serde(default)]
    pub status: AnalysisStatus,
    #[serde(default)]
    pub trend_result_json: Option<String>,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}
