// src/repositories/sqlite/course.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{Course, EntityKind, ListQuery};
use eunoia_common::Error;

use crate::codec::merge_objects;
use crate::repositories::{build_list_sql, decode, encode, EntityRepository};

pub struct CourseRepository {
    pub pool: Pool<Sqlite>,
}

impl CourseRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Option<Course>, Error> {
        let row = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl EntityRepository for CourseRepository {
    async fn insert(&self, data: Value) -> Result<Value, Error> {
        let course: Course = decode(data)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO courses (
                cover_image, title, partner_name, description, total_lessons,
                plus_trial_lessons, free_trial_lessons, price, plus_discount,
                is_featured, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.cover_image)
        .bind(&course.title)
        .bind(&course.partner_name)
        .bind(&course.description)
        .bind(course.total_lessons)
        .bind(course.plus_trial_lessons)
        .bind(course.free_trial_lessons)
        .bind(course.price)
        .bind(course.plus_discount)
        .bind(course.is_featured)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let created = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Course {} vanished after insert", id)))?;
        encode(&created)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error> {
        match self.get(id).await? {
            Some(course) => Ok(Some(encode(&course)?)),
            None => Ok(None),
        }
    }

    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Course {} not found", id)))?;
        let mut merged = encode(&stored)?;
        merge_objects(&mut merged, patch);
        let course: Course = decode(merged)?;

        sqlx::query(
            r#"
            UPDATE courses
            SET cover_image = ?, title = ?, partner_name = ?, description = ?,
                total_lessons = ?, plus_trial_lessons = ?, free_trial_lessons = ?,
                price = ?, plus_discount = ?, is_featured = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.cover_image)
        .bind(&course.title)
        .bind(&course.partner_name)
        .bind(&course.description)
        .bind(course.total_lessons)
        .bind(course.plus_trial_lessons)
        .bind(course.free_trial_lessons)
        .bind(course.price)
        .bind(course.plus_discount)
        .bind(course.is_featured)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Course {} not found", id)))?;
        encode(&updated)
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error> {
        let (sql, bind) = build_list_sql(EntityKind::Course, query);
        let mut rows = sqlx::query_as::<_, Course>(&sql);
        if let Some(email) = bind {
            rows = rows.bind(email);
        }
        let courses = rows.fetch_all(&self.pool).await?;
        courses.iter().map(encode).collect()
    }
}
