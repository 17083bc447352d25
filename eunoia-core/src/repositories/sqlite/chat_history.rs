// src/repositories/sqlite/chat_history.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{ChatHistory, EntityKind, ListQuery};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, ChatHistoryRepo, EntityRepository};

pub struct ChatHistoryRepository {
    pub pool: Pool<Sqlite>,
}

impl ChatHistoryRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<ChatHistory>, Error> {
        let row = sqlx::query_as::<_, ChatHistory>("SELECT * FROM chat_histories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ChatHistoryRepo for ChatHistoryRepository {
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<ChatHistory>, Error> {
        let mut chats = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(chat) = self.get(*id).await? {
                chats.push(chat);
            }
        }
        Ok(chats)
    }
}

#[async_trait]
impl EntityRepository for ChatHistoryRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let chat: ChatHistory = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO chat_histories (
                title, style_name, style_avatar, messages_json, last_message_at,
                created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&chat.title)
        .bind(&chat.style_name)
        .bind(&chat.style_avatar)
        .bind(&chat.messages_json)
        .bind(chat.last_message_at)
        .bind(&chat.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatHistory {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(chat) => Ok(Some(encode(&chat)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatHistory {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let chat: ChatHistory = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE chat_histories
            SET title = ?, style_name = ?, style_avatar = ?, messages_json = ?,
                last_message_at = ?, created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&chat.title)
        .bind(&chat.style_name)
        .bind(&chat.style_avatar)
        .bind(&chat.messages_json)
        .bind(chat.last_message_at)
        .bind(&chat.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ChatHistory {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM chat_histories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::ChatHistory, query);
        let mut rows = sqlx::query_as::<_, ChatHistory>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let chats = rows.fetch_all(&self.pool).await?;
        chats.iter().map(encode).collect()
    }
}
