// src/repositories/sqlite/notification.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{EntityKind, ListQuery, Notification};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository};

pub struct NotificationRepository {
    pub pool: Pool<Sqlite>,
}

impl NotificationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<Notification>, Error> {
        let row = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EntityRepository for NotificationRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let notification: Notification = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (
                type, post_id, post_title, actor_email, actor_name,
                recipient_email, comment_content, is_read, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.kind)
        .bind(notification.post_id)
        .bind(&notification.post_title)
        .bind(&notification.actor_email)
        .bind(&notification.actor_name)
        .bind(&notification.recipient_email)
        .bind(&notification.comment_content)
        .bind(notification.is_read)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Notification {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(notification) => Ok(Some(encode(&notification)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Notification {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let notification: Notification = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE notifications
            SET type = ?, post_id = ?, post_title = ?, actor_email = ?,
                actor_name = ?, recipient_email = ?, comment_content = ?,
                is_read = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&notification.kind)
        .bind(notification.post_id)
        .bind(&notification.post_title)
        .bind(&notification.actor_email)
        .bind(&notification.actor_name)
        .bind(&notification.recipient_email)
        .bind(&notification.comment_content)
        .bind(notification.is_read)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Notification {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::Notification, query);
        let mut rows = sqlx::query_as::<_, Notification>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let notifications = rows.fetch_all(&self.pool).await?;
        notifications.iter().map(encode).collect()
    }
}
