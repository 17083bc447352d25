// src/services/entity_service.rs

use serde_json::Value;
use sqlx::{Pool, Sqlite};

use eunoia_common::models::{EntityKind, ListQuery, Scope, StyleStatus};
use eunoia_common::Error;

use crate::codec;
use crate::repositories::sqlite::{
    ChatHistoryRepository, ChatStyleRepository, CommentRepository, CourseRepository,
    EmotionReportRepository, FavoriteRepository, NotificationRepository, PostRepository,
    TrendAnalysisRepository,
};
use crate::repositories::{ChatStyleRepo, EntityRepository};
use crate::utils::uploads::normalize_shared_style_avatar;

/// The generic gateway: resolves an entity name once, translates between
/// wire and storage shapes through the codec, applies the kind's ownership
/// scope, and routes persona deletes through the cascade.
pub struct EntityService {
    pool: Pool<Sqlite>,
}

impl EntityService {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn resolve(name: &str) -> Result<EntityKind, Error> {
        EntityKind::from_name(name)
            .ok_or_else(|| Error::NotFound(format!("Unknown entity: {}", name)))
    }

    fn repo(&self, kind: EntityKind) -> Box<dyn EntityRepository> {
        let pool = self.pool.clone();
        match kind {
            EntityKind::Post => Box::new(PostRepository::new(pool)),
            EntityKind::Comment => Box::new(CommentRepository::new(pool)),
            EntityKind::Notification => Box::new(NotificationRepository::new(pool)),
            EntityKind::Favorite => Box::new(FavoriteRepository::new(pool)),
            EntityKind::ChatHistory => Box::new(ChatHistoryRepository::new(pool)),
            EntityKind::ChatStyle => Box::new(ChatStyleRepository::new(pool)),
            EntityKind::EmotionReport => Box::new(EmotionReportRepository::new(pool)),
            EntityKind::TrendAnalysis => Box::new(TrendAnalysisRepository::new(pool)),
            EntityKind::Course => Box::new(CourseRepository::new(pool)),
        }
    }

    pub async fn list(
        &self,
        name: &str,
        order: Option<&str>,
        limit: Option<&str>,
        caller_email: &str,
    ) -> Result<Vec<Value>, Error> {
        let kind = Self::resolve(name)?;
        let mut query = ListQuery::from_raw(order, limit);
        if kind.scope() != Scope::Unscoped {
            query.scope_email = Some(caller_email.to_string());
        }
        let rows = self.repo(kind).list(&query).await?;
        Ok(rows.into_iter().map(|row| codec::to_wire(kind, row)).collect())
    }

    pub async fn create(
        &self,
        name: &str,
        mut payload: Value,
        caller_email: &str,
    ) -> Result<Value, Error> {
        let kind = Self::resolve(name)?;

        if kind == EntityKind::Post {
            if let Some(data) = payload.get_mut("shared_style_data") {
                normalize_shared_style_avatar(data);
            }
        }

        let mut storage = codec::to_storage(kind, payload);
        if kind.stamps_creator() {
            if let Value::Object(map) = &mut storage {
                if !map.contains_key("created_by") {
                    map.insert("created_by".to_string(), Value::String(caller_email.to_string()));
                }
            }
        }

        let row = self.repo(kind).insert(storage).await?;
        Ok(codec::to_wire(kind, row))
    }

    pub async fn update(&self, name: &str, id: i64, mut payload: Value) -> Result<Value, Error> {
        let kind = Self::resolve(name)?;

        if kind == EntityKind::Post {
            if let Some(data) = payload.get_mut("shared_style_data") {
                normalize_shared_style_avatar(data);
            }
        }

        let storage = codec::to_storage(kind, payload);
        let row = self.repo(kind).update_merge(id, storage).await?;
        Ok(codec::to_wire(kind, row))
    }

    pub async fn delete(&self, name: &str, id: i64) -> Result<(), Error> {
        let kind = Self::resolve(name)?;
        // Persona deletes cascade onto imported copies; everything else is a
        // plain row delete.
        if kind == EntityKind::ChatStyle {
            return ChatStyleRepository::new(self.pool.clone()).delete_style(id).await;
        }
        self.repo(kind).delete(id).await
    }

    pub async fn style_status(&self, id: i64, caller_email: &str) -> Result<StyleStatus, Error> {
        ChatStyleRepository::new(self.pool.clone()).status(id, caller_email).await
    }
}
