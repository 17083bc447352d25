// src/tasks/seed.rs
//
// Startup seeding: a demo account, the course catalog, and the default
// companion persona. Runs after migrations and is idempotent — each block
// only fires when its table is empty.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use eunoia_common::models::{SubscriptionTier, User};
use eunoia_common::Error;

use crate::db::Database;
use crate::repositories::sqlite::{ChatStyleRepository, CourseRepository, UserRepository};
use crate::repositories::{EntityRepository, UserRepo};

pub async fn seed_defaults(db: &Database) -> Result<(), Error> {
    let pool = db.pool().clone();

    let user_repo = UserRepository::new(pool.clone());
    let (user_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    if user_count == 0 {
        let now = Utc::now();
        let demo = User {
            id: 0,
            email: "demo@local".to_string(),
            password_hash: None,
            nickname: Some("Demo".to_string()),
            full_name: Some("Demo User".to_string()),
            avatar_url: None,
            bio: None,
            subscription_tier: SubscriptionTier::Free,
            daily_chat_count: 0,
            daily_chat_reset_date: None,
            daily_report_count: 0,
            daily_report_reset_date: None,
            created_at: now,
            updated_at: now,
        };
        user_repo.create(&demo).await?;
        info!("Seeded demo user");
    }

    let seed_owner: Option<(String,)> =
        sqlx::query_as("SELECT email FROM users ORDER BY id LIMIT 1")
            .fetch_optional(&pool)
            .await?;
    let owner_email = seed_owner.map(|(email,)| email).unwrap_or_default();

    let course_repo = CourseRepository::new(pool.clone());
    if course_repo.count().await? == 0 {
        course_repo
            .insert(json!({
                "cover_image": "https://picsum.photos/seed/course1/400/200",
                "title": "青少年情绪管理入门",
                "partner_name": "Eunoia Academy",
                "description": "系统学习如何识别与管理情绪",
                "total_lessons": 12,
                "plus_trial_lessons": 3,
                "free_trial_lessons": 1,
                "price": 199.0,
                "plus_discount": 0.1,
                "is_featured": true,
            }))
            .await?;
        course_repo
            .insert(json!({
                "cover_image": "https://picsum.photos/seed/course2/400/200",
                "title": "压力缓解与学习效率",
                "partner_name": "MindLab",
                "description": "改善专注与提升学习效率的方法",
                "total_lessons": 10,
                "plus_trial_lessons": 2,
                "free_trial_lessons": 1,
                "price": 149.0,
                "plus_discount": 0.1,
                "is_featured": true,
            }))
            .await?;
        info!("Seeded course catalog");
    }

    let (style_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_styles")
        .fetch_one(&pool)
        .await?;
    if style_count == 0 {
        ChatStyleRepository::new(pool)
            .insert(json!({
                "name": "暖心陪伴",
                "avatar": "🤗",
                "personality": "温暖共情",
                "background": "陪伴型",
                "dialogue_style": "短句、温柔、肯定",
                "is_default": true,
                "is_imported": false,
                "created_by": owner_email,
            }))
            .await?;
        info!("Seeded default chat style");
    }

    Ok(())
}
