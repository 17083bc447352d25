// tests/usage_tests.rs

use std::sync::Arc;

use chrono::Utc;

use eunoia_common::models::{MeteredAction, SubscriptionTier, User};
use eunoia_core::repositories::sqlite::UserRepository;
use eunoia_core::repositories::UserRepo;
use eunoia_core::services::usage::{today_utc, UsageService};
use eunoia_core::services::UsageDecision;
use eunoia_core::{Database, Error};

async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn new_user(email: &str, tier: SubscriptionTier) -> User {
    let now = Utc::now();
    User {
        id: 0,
        email: email.to_string(),
        password_hash: None,
        nickname: None,
        full_name: None,
        avatar_url: None,
        bio: None,
        subscription_tier: tier,
        daily_chat_count: 0,
        daily_chat_reset_date: None,
        daily_report_count: 0,
        daily_report_reset_date: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_recording_restarts_a_stale_window() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = Arc::new(UserRepository::new(db.pool().clone()));

    let mut user = new_user("a@example.com", SubscriptionTier::Free);
    user.daily_chat_count = 30;
    user.daily_chat_reset_date = Some("2020-01-01".to_string());
    let user = repo.create(&user).await?;

    repo.record_usage(user.id, MeteredAction::ChatMessage, &today_utc()).await?;

    let after = repo.get(user.id).await?.unwrap();
    assert_eq!(after.daily_chat_count, 1);
    assert_eq!(after.daily_chat_reset_date.as_deref(), Some(today_utc().as_str()));
    Ok(())
}

#[tokio::test]
async fn test_recording_increments_inside_the_window() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = Arc::new(UserRepository::new(db.pool().clone()));
    let user = repo.create(&new_user("a@example.com", SubscriptionTier::Free)).await?;

    let today = today_utc();
    repo.record_usage(user.id, MeteredAction::ChatMessage, &today).await?;
    repo.record_usage(user.id, MeteredAction::ChatMessage, &today).await?;
    repo.record_usage(user.id, MeteredAction::EmotionReport, &today).await?;

    let after = repo.get(user.id).await?.unwrap();
    assert_eq!(after.daily_chat_count, 2);
    assert_eq!(after.daily_report_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_free_tier_chat_ceiling_is_enforced_against_the_store() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = Arc::new(UserRepository::new(db.pool().clone()));
    let service = UsageService::new(repo.clone());

    let mut user = new_user("a@example.com", SubscriptionTier::Free);
    user.daily_chat_count = 30;
    user.daily_chat_reset_date = Some(today_utc());
    let user = repo.create(&user).await?;

    let decision = service.authorize(user.id, MeteredAction::ChatMessage).await?;
    assert!(matches!(decision, UsageDecision::Denied(_)));

    // The same stored count with yesterday's stamp is an expired window.
    let mut stale = repo.get(user.id).await?.unwrap();
    stale.daily_chat_reset_date = Some("2020-01-01".to_string());
    repo.update(&stale).await?;

    let decision = service.authorize(user.id, MeteredAction::ChatMessage).await?;
    assert_eq!(decision, UsageDecision::Allowed);
    Ok(())
}

#[tokio::test]
async fn test_free_tier_report_ceiling() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = Arc::new(UserRepository::new(db.pool().clone()));
    let service = UsageService::new(repo.clone());

    let user = repo.create(&new_user("a@example.com", SubscriptionTier::Free)).await?;
    assert_eq!(
        service.authorize(user.id, MeteredAction::EmotionReport).await?,
        UsageDecision::Allowed
    );

    service.record(user.id, MeteredAction::EmotionReport).await?;
    let decision = service.authorize(user.id, MeteredAction::EmotionReport).await?;
    assert!(matches!(decision, UsageDecision::Denied(_)));
    Ok(())
}
