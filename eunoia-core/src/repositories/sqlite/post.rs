// src/repositories/sqlite/post.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{EntityKind, ListQuery, Post};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository};

pub struct PostRepository {
    pub pool: Pool<Sqlite>,
}

impl PostRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<Post>, Error> {
        let row = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EntityRepository for PostRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let post: Post = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                title, content, category, image_url, tags_json, likes_count,
                liked_by_json, comments_count, shared_style_id,
                shared_style_data_json, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.image_url)
        .bind(&post.tags_json)
        .bind(post.likes_count)
        .bind(&post.liked_by_json)
        .bind(post.comments_count)
        .bind(post.shared_style_id)
        .bind(&post.shared_style_data_json)
        .bind(&post.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Post {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(post) => Ok(Some(encode(&post)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Post {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let post: Post = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, category = ?, image_url = ?,
                tags_json = ?, likes_count = ?, liked_by_json = ?,
                comments_count = ?, shared_style_id = ?,
                shared_style_data_json = ?, created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.image_url)
        .bind(&post.tags_json)
        .bind(post.likes_count)
        .bind(&post.liked_by_json)
        .bind(post.comments_count)
        .bind(post.shared_style_id)
        .bind(&post.shared_style_data_json)
        .bind(&post.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Post {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::Post, query);
        let mut rows = sqlx::query_as::<_, Post>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let posts = rows.fetch_all(&self.pool).await?;
        posts.iter().map(encode).collect()
    }
}
