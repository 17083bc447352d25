// File: eunoia-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::models::{
    ChatHistory, ChatStyle, EmotionReport, ListQuery, MeteredAction, StyleStatus,
    TrendAnalysis, User,
};

/// Storage operations shared by every gateway entity type. Values are in
/// storage shape (blob columns serialized); the codec owns the translation
/// to and from wire shape.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Insert a new row and return it as stored.
    async fn insert(&self, data: Value) -> Result<Value, Error>;

    /// Fetch one row by id.
    async fn fetch(&self, id: i64) -> Result<Option<Value>, Error>;

    /// Partial update: merge `patch` over the stored row and write back.
    async fn update_merge(&self, id: i64, patch: Value) -> Result<Value, Error>;

    /// Delete one row by id.
    async fn delete(&self, id: i64) -> Result<(), Error>;

    /// List rows, applying the query's scope filter, order, and limit.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, Error>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, Error>;
    async fn get(&self, id: i64) -> Result<Option<User>, Error>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, Error>;
    async fn update(&self, user: &User) -> Result<(), Error>;

    /// Bump a daily counter: increments when the stored reset date equals
    /// `today`, otherwise restarts the window at 1. Single statement, so
    /// concurrent bumps never lose an increment.
    async fn record_usage(
        &self,
        user_id: i64,
        action: MeteredAction,
        today: &str,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait ChatStyleRepo: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<ChatStyle>, Error>;

    /// Delete a style. Removing an original also flags every imported copy
    /// as deleted-by-author, atomically; removing a copy touches only that
    /// row. Missing ids are a no-op.
    async fn delete_style(&self, id: i64) -> Result<(), Error>;

    /// Existence/orphan status visible to any authenticated caller.
    async fn status(&self, id: i64, caller_email: &str) -> Result<StyleStatus, Error>;
}

#[async_trait]
pub trait ChatHistoryRepo: Send + Sync {
    /// Fetch the given conversations, skipping ids that no longer exist,
    /// preserving the requested order.
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<ChatHistory>, Error>;
}

#[async_trait]
pub trait EmotionReportRepo: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<EmotionReport>, Error>;
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<EmotionReport>, Error>;

    /// Terminal transition to `completed` with the structured result.
    async fn mark_completed(&self, id: i64, result_json: &str) -> Result<(), Error>;

    /// Terminal transition to `failed`.
    async fn mark_failed(&self, id: i64) -> Result<(), Error>;
}

#[async_trait]
pub trait TrendAnalysisRepo: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<TrendAnalysis>, Error>;
    async fn mark_completed(&self, id: i64, result_json: &str) -> Result<(), Error>;
    async fn mark_failed(&self, id: i64) -> Result<(), Error>;
}
