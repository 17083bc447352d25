// src/services/analysis.rs
//
// LLM-backed analysis pipeline. A report/trend record is created in the
// `analyzing` state by the gateway; the orchestrator runs detached from the
// creating request and transitions the record exactly once, to `completed`
// with a structured result or to `failed`. The status field is the only
// failure signal a caller ever sees.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use eunoia_ai::{LlmClient, LlmRequest};
use eunoia_common::models::{ChatHistory, ChatMessage, EmotionReport};
use eunoia_common::Error;

use crate::codec::parse_json_safe;
use crate::repositories::{ChatHistoryRepo, EmotionReportRepo, TrendAnalysisRepo};

pub struct AnalysisService {
    llm: Arc<LlmClient>,
    chats: Arc<dyn ChatHistoryRepo>,
    reports: Arc<dyn EmotionReportRepo>,
    trends: Arc<dyn TrendAnalysisRepo>,
}

/// Expected result shape for an emotion report.
pub fn report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "emotional_trend": { "type": "string" },
            "dominant_emotions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "emotion": { "type": "string" },
                        "percentage": { "type": "number" },
                        "description": { "type": "string" }
                    }
                }
            },
            "potential_issues": {
                "type": "array",
                "items": { "type": "string" }
            },
            "suggestions": {
                "type": "array",
                "items": { "type": "string" }
            },
            "overall_assessment": { "type": "string" }
        }
    })
}

/// Expected result shape for a trend analysis.
pub fn trend_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "overall_trend": { "type": "string" },
            "key_changes": { "type": "array", "items": { "type": "string" } },
            "improvement_areas": { "type": "array", "items": { "type": "string" } },
            "warning_signs": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["overall_trend"]
    })
}

/// Counselor instruction assembled from the selected conversations.
pub fn build_report_prompt(chats: &[ChatHistory]) -> String {
    let mut transcript_blocks = String::new();
    for (idx, chat) in chats.iter().enumerate() {
        let title = chat.title.as_deref().unwrap_or("");
        let style = chat.style_name.as_deref().unwrap_or("");
        let mut lines = String::new();
        let messages = parse_json_safe(chat.messages_json.as_deref(), true);
        if let Some(records) = messages.as_array() {
            for record in records {
                // Records that lack role/content are display-only noise.
                let Ok(message) = serde_json::from_value::<ChatMessage>(record.clone()) else {
                    continue;
                };
                let speaker = if message.role == "user" { "用户" } else { "AI" };
                lines.push_str(&format!("{}：{}\n", speaker, message.content));
            }
        }
        transcript_blocks.push_str(&format!(
            "\n## 对话{}：{}\n使用角色：{}\n{}",
            idx + 1,
            title,
            style,
            lines
        ));
    }

    format!(
        r#"你是一位专业的青少年心理咨询师，请根据以下对话记录进行深入的情绪分析。

# 分析对象
12-18岁青少年的AI聊天记录

# 对话记录
{}

# 分析要求
请从以下几个维度进行专业分析：

1. **情绪倾向总结**：分析用户在对话中表现出的整体情绪状态，包括情绪的强度、持续性和变化趋势。

2. **主要情绪分布**：识别用户表达的主要情绪类型（如焦虑、沮丧、愤怒、喜悦、恐惧等），评估每种情绪的占比和具体表现。

3. **潜在心理问题**：基于对话内容，谨慎推断可能存在的心理健康问题（如考试焦虑、人际关系困扰、自我认同问题、抑郁倾向等），注意不要过度诊断。

4. **积极建议**：提供3-5条具体、可操作的建议，帮助用户改善情绪状态和心理健康。建议应该温和、鼓励性的，适合青少年理解和实践。

5. **总体评估**：给出一个简明的总体心理健康状态评估，包括积极方面和需要关注的方面。

# 注意事项
- 保持专业、客观、温和的语气
- 避免使用过于医学化的术语
- 关注青少年的特殊心理需求
- 强调积极面，给予希望和鼓励
- 如果发现严重问题，建议寻求专业帮助

请以JSON格式返回分析结果。"#,
        transcript_blocks
    )
}

/// Trend instruction assembled from prior report summaries.
pub fn build_trend_prompt(reports: &[EmotionReport]) -> String {
    let summary_blocks: Vec<String> = reports
        .iter()
        .enumerate()
        .map(|(idx, report)| {
            let result = parse_json_safe(report.analysis_result_json.as_deref(), false);
            format!(
                "报告{}：总体({}); 趋势({}); 主导情绪({}); 建议({})",
                idx + 1,
                result["overall_assessment"].as_str().unwrap_or(""),
                result["emotional_trend"].as_str().unwrap_or(""),
                join_emotions(&result["dominant_emotions"]),
                join_strings(&result["suggestions"], "; "),
            )
        })
        .collect();

    [
        "你是一名专业的情绪分析师。".to_string(),
        "基于用户最近的多份情绪报告，进行趋势综合分析。".to_string(),
        "请给出整体趋势、关键变化点、改进建议、需要关注的信号，输出严格的 JSON。".to_string(),
        "以下是报告摘要：".to_string(),
        summary_blocks.join("\n"),
    ]
    .join("\n\n")
}

fn join_emotions(value: &Value) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|item| {
            item.as_str()
                .or_else(|| item["emotion"].as_str())
                .map(str::to_string)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_strings(value: &Value, separator: &str) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Selected-id lists arrive through the gateway and may carry numbers or
/// numeric strings.
fn selected_ids(json_text: Option<&str>) -> Vec<i64> {
    let parsed = parse_json_safe(json_text, true);
    let Some(items) = parsed.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            item.as_i64()
                .or_else(|| item.as_str().and_then(|s| s.parse::<i64>().ok()))
        })
        .collect()
}

impl AnalysisService {
    pub fn new(
        llm: Arc<LlmClient>,
        chats: Arc<dyn ChatHistoryRepo>,
        reports: Arc<dyn EmotionReportRepo>,
        trends: Arc<dyn TrendAnalysisRepo>,
    ) -> Self {
        Self { llm, chats, reports, trends }
    }

    /// Analyze an emotion report. Never returns an error: any failure is
    /// logged and recorded as the report's terminal `failed` status.
    pub async fn run_report_analysis(&self, report_id: i64) {
        if let Err(e) = self.report_analysis_inner(report_id).await {
            error!("Emotion report {} analysis failed: {}", report_id, e);
            if let Err(mark_err) = self.reports.mark_failed(report_id).await {
                error!("Could not mark report {} as failed: {}", report_id, mark_err);
            }
        }
    }

    async fn report_analysis_inner(&self, report_id: i64) -> Result<(), Error> {
        let Some(report) = self.reports.get(report_id).await? else {
            warn!("Emotion report {} disappeared before analysis", report_id);
            return Ok(());
        };

        let ids = selected_ids(report.selected_chats_json.as_deref());
        let chats = self.chats.get_by_ids(&ids).await?;
        let prompt = build_report_prompt(&chats);

        let result = self
            .llm
            .invoke(LlmRequest {
                prompt,
                response_json_schema: Some(report_schema()),
                model: None,
            })
            .await?;

        self.reports.mark_completed(report_id, &result.to_string()).await?;
        info!("Emotion report {} analysis completed", report_id);
        Ok(())
    }

    /// Analyze a trend record over its selected reports. Same terminal
    /// semantics as report analysis.
    pub async fn run_trend_analysis(&self, trend_id: i64) {
        if let Err(e) = self.trend_analysis_inner(trend_id).await {
            error!("Trend analysis {} failed: {}", trend_id, e);
            if let Err(mark_err) = self.trends.mark_failed(trend_id).await {
                error!("Could not mark trend {} as failed: {}", trend_id, mark_err);
            }
        }
    }

    async fn trend_analysis_inner(&self, trend_id: i64) -> Result<(), Error> {
        let Some(trend) = self.trends.get(trend_id).await? else {
            warn!("Trend analysis {} disappeared before analysis", trend_id);
            return Ok(());
        };

        let ids = selected_ids(trend.selected_reports_json.as_deref());
        let reports = self.reports.get_by_ids(&ids).await?;
        let prompt = build_trend_prompt(&reports);

        let result = self
            .llm
            .invoke(LlmRequest {
                prompt,
                response_json_schema: Some(trend_schema()),
                model: None,
            })
            .await?;

        self.trends.mark_completed(trend_id, &result.to_string()).await?;
        info!("Trend analysis {} completed", trend_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eunoia_common::models::AnalysisStatus;

    fn chat(title: &str, style: &str, messages: Value) -> ChatHistory {
        ChatHistory {
            id: 1,
            title: Some(title.to_string()),
            style_name: Some(style.to_string()),
            style_avatar: None,
            messages_json: Some(messages.to_string()),
            last_message_at: None,
            created_by: Some("a@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn report_prompt_carries_transcripts_and_instructions() {
        let chats = vec![chat(
            "考试周",
            "冷静分析",
            json!([
                {"role": "user", "content": "我好紧张"},
                {"role": "assistant", "content": "深呼吸，我们一步步来"}
            ]),
        )];
        let prompt = build_report_prompt(&chats);
        assert!(prompt.contains("## 对话1：考试周"));
        assert!(prompt.contains("使用角色：冷静分析"));
        assert!(prompt.contains("用户：我好紧张"));
        assert!(prompt.contains("AI：深呼吸，我们一步步来"));
        assert!(prompt.contains("请以JSON格式返回分析结果。"));
    }

    #[test]
    fn trend_prompt_summarizes_prior_results() {
        let report = EmotionReport {
            id: 9,
            title: Some("报告".to_string()),
            selected_chats_json: None,
            status: AnalysisStatus::Completed,
            analysis_result_json: Some(
                json!({
                    "overall_assessment": "整体平稳",
                    "emotional_trend": "好转",
                    "dominant_emotions": [{"emotion": "焦虑", "percentage": 40.0}],
                    "suggestions": ["多运动", "规律作息"]
                })
                .to_string(),
            ),
            is_viewed: false,
            analyzed_at: None,
            created_by: Some("a@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let prompt = build_trend_prompt(&[report]);
        assert!(prompt.contains("报告1：总体(整体平稳); 趋势(好转); 主导情绪(焦虑); 建议(多运动; 规律作息)"));
        assert!(prompt.contains("以下是报告摘要："));
    }

    #[test]
    fn selected_ids_accepts_numbers_and_numeric_strings() {
        assert_eq!(selected_ids(Some("[1, \"2\", 3, \"x\"]")), vec![1, 2, 3]);
        assert_eq!(selected_ids(Some("not json")), Vec::<i64>::new());
        assert_eq!(selected_ids(None), Vec::<i64>::new());
    }
}
