// src/repositories/sqlite/trend_analysis.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{AnalysisStatus, EntityKind, ListQuery, TrendAnalysis};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository, TrendAnalysisRepo};

pub struct TrendAnalysisRepository {
    pub pool: Pool<Sqlite>,
}

impl TrendAnalysisRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get_trend(&self, id: i64) -> Result<Option<TrendAnalysis>, Error> {
        let row = sqlx::query_as::<_, TrendAnalysis>("SELECT * FROM trend_analyses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl TrendAnalysisRepo for TrendAnalysisRepository {
    async fn get(&self, id: i64) -> Result<Option<TrendAnalysis>, Error> {
        self.get_trend(id).await
    }

    async fn mark_completed(&self, id: i64, result_json: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE trend_analyses
            SET status = ?, trend_result_json = ?, analyzed_at = ?, updated_at = ?
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
            UPDATE trend_analyses
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
impl EntityRepository for TrendAnalysisRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let trend: TrendAnalysis = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO trend_analyses (
                title, selected_reports_json, status, trend_result_json,
                analyzed_at, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trend.title)
        .bind(&trend.selected_reports_json)
        .bind(trend.status)
        .bind(&trend.trend_result_json)
        .bind(trend.analyzed_at)
        .bind(&trend.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get_trend(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("TrendAnalysis {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get_trend(id).await? {
            Some(trend) => Ok(Some(encode(&trend)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get_trend(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("TrendAnalysis {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let trend: TrendAnalysis = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE trend_analyses
            SET title = ?, selected_reports_json = ?, status = ?,
                trend_result_json = ?, analyzed_at = ?, created_by = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&trend.title)
        .bind(&trend.selected_reports_json)
        .bind(trend.status)
        .bind(&trend.trend_result_json)
        .bind(trend.analyzed_at)
        .bind(&trend.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get_trend(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("TrendAnalysis {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM trend_analyses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::TrendAnalysis, query);
        let mut rows = sqlx::query_as::<_, TrendAnalysis>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let trends = rows.fetch_all(&self.pool).await?;
        trends.iter().map(encode).collect()
    }
}
