// src/repositories/sqlite/chat_style.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite, Transaction};
use tracing::info;

use eunoia_common::models::{ChatStyle, EntityKind, ListQuery, StyleStatus};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, ChatStyleRepo, EntityRepository};

pub struct ChatStyleRepository {
    pub pool: Pool<Sqlite>,
}

impl ChatStyleRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get_style(&self, id: i64) -> Result<Option<ChatStyle>, Error> {
        let row = sqlx::query_as::<_, ChatStyle>("SELECT * FROM chat_styles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Flag every imported copy of the style as deleted-by-author, then remove
/// the original itself. Runs inside the caller's transaction so neither
/// effect is ever visible without the other.
pub async fn cascade_delete_original(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        UPDATE chat_styles
        SET is_deleted_by_author = 1,
            updated_at = ?
        WHERE original_style_id = ?
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM chat_styles WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[async_trait]
impl ChatStyleRepo for ChatStyleRepository {
    async fn get(&self, id: i64) -> Result<Option<ChatStyle>, Error> {
        self.get_style(id).await
    }

    async fn delete_style(&self, id: i64) -> Result<(), Error> {
        let Some(style) = self.get_style(id).await? else {
            return Ok(());
        };

        if !style.is_imported {
            let mut tx = self.pool.begin().await?;
            cascade_delete_original(&mut tx, id).await?;
            tx.commit().await?;
            info!("Deleted original style {} and orphaned its imported copies", id);
            return Ok(());
        }

        // Imported copies (orphaned or not) are removed without a cascade.
        sqlx::query("DELETE FROM chat_styles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn status(&self, id: i64, caller_email: &str) -> Result<StyleStatus, Error> {
        let Some(style) = self.get_style(id).await? else {
            return Ok(StyleStatus::missing());
        };

        // Status and essential metadata only; the persona's content stays
        // with its owner.
        Ok(StyleStatus {
            exists: true,
            is_deleted_by_author: Some(style.is_deleted_by_author),
            is_imported: Some(style.is_imported),
            author_email: style.created_by.clone(),
            name: Some(style.name.clone()),
            is_accessible: Some(style.created_by.as_deref() == Some(caller_email)),
        })
    }
}

#[async_trait]
impl EntityRepository for ChatStyleRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let style: ChatStyle = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO chat_styles (
                name, avatar, personality, background, dialogue_style,
                is_default, is_imported, original_style_id,
                original_author_email, original_author_name,
                is_deleted_by_author, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&style.name)
        .bind(&style.avatar)
        .bind(&style.personality)
        .bind(&style.background)
        .bind(&style.dialogue_style)
        .bind(style.is_default)
        .bind(style.is_imported)
        .bind(style.original_style_id)
        .bind(&style.original_author_email)
        .bind(&style.original_author_name)
        .bind(style.is_deleted_by_author)
        .bind(&style.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get_style(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatStyle {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get_style(id).await? {
            Some(style) => Ok(Some(encode(&style)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get_style(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatStyle {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let style: ChatStyle = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE chat_styles
            SET name = ?, avatar = ?, personality = ?, background = ?,
                dialogue_style = ?, is_default = ?, is_imported = ?,
                original_style_id = ?, original_author_email = ?,
                original_author_name = ?, is_deleted_by_author = ?,
                created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&style.name)
        .bind(&style.avatar)
        .bind(&style.personality)
        .bind(&style.background)
        .bind(&style.dialogue_style)
        .bind(style.is_default)
        .bind(style.is_imported)
        .bind(style.original_style_id)
        .bind(&style.original_author_email)
        .bind(&style.original_author_name)
        .bind(style.is_deleted_by_author)
        .bind(&style.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get_style(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatStyle {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        self.delete_style(id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::ChatStyle, query);
        let mut rows = sqlx::query_as::<_, ChatStyle>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let styles = rows.fetch_all(&self.pool).await?;
        styles.iter().map(encode).collect()
    }
}
