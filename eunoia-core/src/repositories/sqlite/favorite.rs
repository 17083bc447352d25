// src/repositories/sqlite/favorite.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{EntityKind, Favorite, ListQuery};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository};

pub struct FavoriteRepository {
    pub pool: Pool<Sqlite>,
}

impl FavoriteRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<Favorite>, Error> {
        let row = sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EntityRepository for FavoriteRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let favorite: Favorite = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (post_id, post_title, post_author_email, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(favorite.post_id)
        .bind(&favorite.post_title)
        .bind(&favorite.post_author_email)
        .bind(&favorite.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Favorite {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(favorite) => Ok(Some(encode(&favorite)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Favorite {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let favorite: Favorite = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE favorites
            SET post_id = ?, post_title = ?, post_author_email = ?, created_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(favorite.post_id)
        .bind(&favorite.post_title)
        .bind(&favorite.post_author_email)
        .bind(&favorite.created_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Favorite {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::Favorite, query);
        let mut rows = sqlx::query_as::<_, Favorite>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let favorites = rows.fetch_all(&self.pool).await?;
        favorites.iter().map(encode).collect()
    }
}
