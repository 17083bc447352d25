// src/repositories/sqlite/comment.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{Comment, EntityKind, ListQuery};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository};

pub struct CommentRepository {
    pub pool: Pool<Sqlite>,
}

impl CommentRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<Comment>, Error> {
        let row = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EntityRepository for CommentRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let comment: Comment = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_name, content, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.post_id)
        .bind(&comment.author_name)
        .bind(&comment.content)
        .bind(&comment.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Comment {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(comment) => Ok(Some(encode(&comment)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Comment {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let comment: Comment = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE comments
            SET post_id = ?, author_name = ?, content = ?, created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(comment.post_id)
        .bind(&comment.author_name)
        .bind(&comment.content)
        .bind(&comment.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Comment {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::Comment, query);
        let mut rows = sqlx::query_as::<_, Comment>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let comments = rows.fetch_all(&self.pool).await?;
        comments.iter().map(encode).collect()
    }
}
