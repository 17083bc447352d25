// tests/analysis_tests.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use eunoia_ai::{ChatMessage, LlmClient, ModelProvider};
use eunoia_common::models::AnalysisStatus;
use eunoia_core::codec::parse_json_safe;
use eunoia_core::repositories::sqlite::{
    ChatHistoryRepository, EmotionReportRepository, TrendAnalysisRepository,
};
use eunoia_core::repositories::{EmotionReportRepo, TrendAnalysisRepo};
use eunoia_core::services::{AnalysisService, EntityService};
use eunoia_core::{Database, Error};

/// Canned provider so tests never leave the process.
struct MockProvider {
    response: Result<String, String>,
    seen: Arc<Mutex<Vec<ChatMessage>>>,
}

impl MockProvider {
    fn replying(text: &str) -> Self {
        Self { response: Ok(text.to_string()), seen: Arc::new(Mutex::new(Vec::new())) }
    }

    fn failing(message: &str) -> Self {
        Self { response: Err(message.to_string()), seen: Arc::new(Mutex::new(Vec::new())) }
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: Option<&str>,
    ) -> anyhow::Result<String> {
        self.seen.lock().unwrap().extend(messages);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn analysis_service(db: &Database, provider: Arc<MockProvider>) -> AnalysisService {
    let pool = db.pool().clone();
    AnalysisService::new(
        Arc::new(LlmClient::new(provider)),
        Arc::new(ChatHistoryRepository::new(pool.clone())),
        Arc::new(EmotionReportRepository::new(pool.clone())),
        Arc::new(TrendAnalysisRepository::new(pool)),
    )
}

async fn create_report(db: &Database, chat_ids: &[i64]) -> i64 {
    let service = EntityService::new(db.pool().clone());
    let created = service
        .create(
            "EmotionReport",
            json!({
                "title": "情绪分析报告",
                "selected_chats": chat_ids,
                "status": "analyzing",
            }),
            "a@example.com",
        )
        .await
        .unwrap();
    created["id"].as_i64().unwrap()
}

async fn create_chat(db: &Database) -> i64 {
    let service = EntityService::new(db.pool().clone());
    let created = service
        .create(
            "ChatHistory",
            json!({
                "title": "考试周",
                "style_name": "冷静分析",
                "messages": [
                    {"role": "user", "content": "我好紧张"},
                    {"role": "assistant", "content": "深呼吸"}
                ],
            }),
            "a@example.com",
        )
        .await
        .unwrap();
    created["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_malformed_llm_output_still_completes_the_report() -> Result<(), Error> {
    let db = setup_test_db().await;
    let chat_id = create_chat(&db).await;
    let report_id = create_report(&db, &[chat_id]).await;

    let provider = Arc::new(MockProvider::replying("sorry, error"));
    let service = analysis_service(&db, provider.clone());
    service.run_report_analysis(report_id).await;

    let repo = EmotionReportRepository::new(db.pool().clone());
    let report = repo.get(report_id).await?.unwrap();
    assert_eq!(report.status, AnalysisStatus::Completed);

    let result = parse_json_safe(report.analysis_result_json.as_deref(), false);
    assert_eq!(result["raw_text"], "sorry, error");
    assert_eq!(result["parse_error"], true);
    assert!(report.analyzed_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_report_prompt_carries_schema_hint_and_transcript() -> Result<(), Error> {
    let db = setup_test_db().await;
    let chat_id = create_chat(&db).await;
    let report_id = create_report(&db, &[chat_id]).await;

    let provider = Arc::new(MockProvider::replying(r#"{"overall_assessment": "平稳"}"#));
    let service = analysis_service(&db, provider.clone());
    service.run_report_analysis(report_id).await;

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].role, "system");
    assert!(seen[0].content.contains("JSON结构"));
    assert!(seen[0].content.contains("dominant_emotions"));
    assert_eq!(seen[1].role, "user");
    assert!(seen[1].content.contains("## 对话1：考试周"));
    assert!(seen[1].content.contains("用户：我好紧张"));
    Ok(())
}

#[tokio::test]
async fn test_provider_failure_marks_the_report_failed() -> Result<(), Error> {
    let db = setup_test_db().await;
    let chat_id = create_chat(&db).await;
    let report_id = create_report(&db, &[chat_id]).await;

    let provider = Arc::new(MockProvider::failing("upstream unavailable"));
    let service = analysis_service(&db, provider);
    service.run_report_analysis(report_id).await;

    let repo = EmotionReportRepository::new(db.pool().clone());
    let report = repo.get(report_id).await?.unwrap();
    assert_eq!(report.status, AnalysisStatus::Failed);
    assert!(report.analysis_result_json.is_none());
    Ok(())
}

#[tokio::test]
async fn test_trend_analysis_completes_with_structured_result() -> Result<(), Error> {
    let db = setup_test_db().await;
    let entity_service = EntityService::new(db.pool().clone());

    // A completed source report with a stored result for the summary.
    let chat_id = create_chat(&db).await;
    let report_id = create_report(&db, &[chat_id]).await;
    let report_repo = EmotionReportRepository::new(db.pool().clone());
    report_repo
        .mark_completed(
            report_id,
            &json!({
                "overall_assessment": "整体平稳",
                "emotional_trend": "好转",
                "dominant_emotions": [{"emotion": "焦虑"}],
                "suggestions": ["多运动"]
            })
            .to_string(),
        )
        .await?;

    let created = entity_service
        .create(
            "TrendAnalysis",
            json!({
                "title": "趋势分析",
                "selected_reports": [report_id],
                "status": "analyzing",
            }),
            "a@example.com",
        )
        .await?;
    let trend_id = created["id"].as_i64().unwrap();

    let provider = Arc::new(MockProvider::replying(
        r#"{"overall_trend": "improving", "key_changes": ["less anxiety"]}"#,
    ));
    let service = analysis_service(&db, provider.clone());
    service.run_trend_analysis(trend_id).await;

    let trend_repo = TrendAnalysisRepository::new(db.pool().clone());
    let trend = trend_repo.get(trend_id).await?.unwrap();
    assert_eq!(trend.status, AnalysisStatus::Completed);
    let result = parse_json_safe(trend.trend_result_json.as_deref(), false);
    assert_eq!(result["overall_trend"], "improving");

    // The trend prompt summarized the prior report.
    let seen = provider.seen.lock().unwrap();
    let user_prompt = &seen.last().unwrap().content;
    assert!(user_prompt.contains("报告1：总体(整体平稳)"));
    Ok(())
}
