// src/repositories/sqlite/user.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{MeteredAction, User};
use eunoia_common::Error;

use crate::repositories::UserRepo;

pub struct UserRepository {
    pub pool: Pool<Sqlite>,
}

impl UserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for UserRepository {
    async fn create(&self, user: &User) -> Result<User, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                email, password_hash, nickname, full_name, avatar_url, bio,
                subscription_tier, daily_chat_count, daily_chat_reset_date,
                daily_report_count, daily_report_reset_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(user.subscription_tier)
        .bind(user.daily_chat_count)
        .bind(&user.daily_chat_reset_date)
        .bind(user.daily_report_count)
        .bind(&user.daily_report_reset_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} vanished after insert", id)))
    }

    async fn get(&self, id: i64) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?,
                nickname = ?,
                full_name = ?,
                avatar_url = ?,
                bio = ?,
                subscription_tier = ?,
                daily_chat_count = ?,
                daily_chat_reset_date = ?,
                daily_report_count = ?,
                daily_report_reset_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(user.subscription_tier)
        .bind(user.daily_chat_count)
        .bind(&user.daily_chat_reset_date)
        .bind(user.daily_report_count)
        .bind(&user.daily_report_reset_date)
        .bind(Utc::now())
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_usage(
        &self,
        user_id: i64,
        action: MeteredAction,
        today: &str,
    ) -> Result<(), Error> {
        // One statement: an increment inside the current window, a restart
        // at 1 otherwise. Concurrent bumps cannot lose an increment.
        let sql = match action {
            MeteredAction::ChatMessage => {
                r#"
                UPDATE users
                SET daily_chat_count =
                        CASE WHEN daily_chat_reset_date = ?
                             THEN daily_chat_count + 1
                             ELSE 1
                        END,
                    daily_chat_reset_date = ?,
                    updated_at = ?
                WHERE id = ?
                "#
            }
            MeteredAction::EmotionReport => {
                r#"
                UPDATE users
                SET daily_report_count =
                        CASE WHEN daily_report_reset_date = ?
                             THEN daily_report_count + 1
                             ELSE 1
                        END,
                    daily_report_reset_date = ?,
                    updated_at = ?
                WHERE id = ?
                "#
            }
        };

        sqlx::query(sql)
            .bind(today)
            .bind(today)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
