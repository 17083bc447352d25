// tests/style_cascade_tests.rs

use serde_json::json;

use eunoia_core::repositories::sqlite::chat_style::cascade_delete_original;
use eunoia_core::repositories::sqlite::ChatStyleRepository;
use eunoia_core::repositories::ChatStyleRepo;
use eunoia_core::services::EntityService;
use eunoia_core::{Database, Error};

async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

async fn create_style(
    service: &EntityService,
    name: &str,
    owner: &str,
    original_style_id: Option<i64>,
) -> i64 {
    let mut payload = json!({
        "name": name,
        "avatar": "🤗",
        "personality": "温暖共情",
        "is_imported": original_style_id.is_some(),
    });
    if let Some(original) = original_style_id {
        payload["original_style_id"] = json!(original);
        payload["original_author_email"] = json!("author@example.com");
    }
    let created = service.create("ChatStyle", payload, owner).await.unwrap();
    created["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_deleting_an_original_orphans_every_copy() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());
    let repo = ChatStyleRepository::new(db.pool().clone());

    let original = create_style(&service, "小太阳", "author@example.com", None).await;
    let copy_one = create_style(&service, "小太阳", "b@example.com", Some(original)).await;
    let copy_two = create_style(&service, "小太阳", "c@example.com", Some(original)).await;
    let unrelated = create_style(&service, "另一个", "d@example.com", None).await;

    service.delete("ChatStyle", original).await?;

    assert!(repo.get(original).await?.is_none());
    for copy in [copy_one, copy_two] {
        let style = repo.get(copy).await?.expect("copy should survive");
        assert!(style.is_deleted_by_author);
    }
    let untouched = repo.get(unrelated).await?.unwrap();
    assert!(!untouched.is_deleted_by_author);
    Ok(())
}

#[tokio::test]
async fn test_deleting_an_imported_copy_does_not_cascade() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());
    let repo = ChatStyleRepository::new(db.pool().clone());

    let original = create_style(&service, "小太阳", "author@example.com", None).await;
    let copy_one = create_style(&service, "小太阳", "b@example.com", Some(original)).await;
    let copy_two = create_style(&service, "小太阳", "c@example.com", Some(original)).await;

    service.delete("ChatStyle", copy_one).await?;

    assert!(repo.get(copy_one).await?.is_none());
    assert!(repo.get(original).await?.is_some());
    let sibling = repo.get(copy_two).await?.unwrap();
    assert!(!sibling.is_deleted_by_author);
    Ok(())
}

#[tokio::test]
async fn test_deleting_a_missing_style_is_a_no_op() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());
    service.delete("ChatStyle", 12345).await?;
    Ok(())
}

#[tokio::test]
async fn test_interrupted_cascade_leaves_no_partial_state() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());
    let repo = ChatStyleRepository::new(db.pool().clone());

    let original = create_style(&service, "小太阳", "author@example.com", None).await;
    let copy = create_style(&service, "小太阳", "b@example.com", Some(original)).await;

    // Run both cascade steps, then abort the transaction as a stand-in for
    // a failure between them and the commit.
    {
        let mut tx = db.pool().begin().await?;
        cascade_delete_original(&mut tx, original).await?;
        tx.rollback().await?;
    }

    // Neither effect may be visible on its own.
    assert!(repo.get(original).await?.is_some());
    let copy_row = repo.get(copy).await?.unwrap();
    assert!(!copy_row.is_deleted_by_author);
    Ok(())
}

#[tokio::test]
async fn test_status_check_reports_without_leaking_content() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let original = create_style(&service, "小太阳", "author@example.com", None).await;
    let copy = create_style(&service, "小太阳", "b@example.com", Some(original)).await;
    service.delete("ChatStyle", original).await?;

    let status = service.style_status(copy, "b@example.com").await?;
    assert!(status.exists);
    assert_eq!(status.is_deleted_by_author, Some(true));
    assert_eq!(status.is_imported, Some(true));
    assert_eq!(status.author_email.as_deref(), Some("b@example.com"));
    assert_eq!(status.is_accessible, Some(true));

    // A different caller sees the status but does not own it.
    let other = service.style_status(copy, "someone@example.com").await?;
    assert_eq!(other.is_accessible, Some(false));

    // The projection never carries the persona's content.
    let as_json = serde_json::to_value(&other)?;
    assert!(as_json.get("personality").is_none());
    assert!(as_json.get("background").is_none());

    let missing = service.style_status(987654, "b@example.com").await?;
    assert!(!missing.exists);
    Ok(())
}
