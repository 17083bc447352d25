// src/repositories/sqlite/emotion_report.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{AnalysisStatus, EmotionReport, EntityKind, ListQuery};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EmotionReportRepo, EntityRepository};

pub struct EmotionReportRepository {
    pub pool: Pool<Sqlite>,
}

impl EmotionReportRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get_report(&self, id: i64) -> Result<Option<EmotionReport>, Error> {
        let row = sqlx::query_as::<_, EmotionReport>("SELECT * FROM emotion_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EmotionReportRepo for EmotionReportRepository {
    async fn get(&self, id: i64) -> Result<Option<EmotionReport>, Error> {
        self.get_report(id).await
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<EmotionReport>, Error> {
        let mut reports = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(report) = self.get_report(*id).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    async fn mark_completed(&self, id: i64, result_json: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE emotion_reports
            SET status = ?, analysis_result_json = ?, analyzed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(AnalysisStatus::Completed)
        .bind(result_json)
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: i64) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE emotion_reports
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(AnalysisStatus::Failed)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityRepository for EmotionReportRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let report: EmotionReport = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO emotion_reports (
                title, selected_chats_json, status, analysis_result_json,
                is_viewed, analyzed_at, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.title)
        .bind(&report.selected_chats_json)
        .bind(report.status)
        .bind(&report.analysis_result_json)
        .bind(report.is_viewed)
        .bind(report.analyzed_at)
        .bind(&report.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get_report(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("EmotionReport {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get_report(id).await? {
            Some(report) => Ok(Some(encode(&report)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get_report(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("EmotionReport {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let report: EmotionReport = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE emotion_reports
            SET title = ?, selected_chats_json = ?, status = ?,
                analysis_result_json = ?, is_viewed = ?, analyzed_at = ?,
                created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&report.title)
        .bind(&report.selected_chats_json)
        .bind(report.status)
        .bind(&report.analysis_result_json)
        .bind(report.is_viewed)
        .bind(report.analyzed_at)
        .bind(&report.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get_report(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("EmotionReport {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM emotion_reports WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::EmotionReport, query);
        let mut rows = sqlx::query_as::<_, EmotionReport>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let reports = rows.fetch_all(&self.pool).await?;
        reports.iter().map(encode).collect()
    }
}
