// tests/entity_service_tests.rs

use serde_json::json;

use eunoia_core::services::EntityService;
use eunoia_core::{Database, Error};

async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test]
async fn test_post_create_and_round_trip() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let created = service
        .create(
            "Post",
            json!({
                "title": "今天有点焦虑",
                "content": "感觉作业好多",
                "category": "Treehole",
                "tags": ["学习", "焦虑"],
                "liked_by": [],
            }),
            "a@example.com",
        )
        .await?;

    assert!(created["id"].as_i64().unwrap() > 0);
    assert_eq!(created["tags"], json!(["学习", "焦虑"]));
    assert_eq!(created["liked_by"], json!([]));
    assert_eq!(created["created_by"], "a@example.com");
    // The raw blob columns never reach the wire.
    assert!(created.get("tags_json").is_none());

    let listed = service.list("Post", None, None, "b@example.com").await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["tags"], json!(["学习", "焦虑"]));
    Ok(())
}

#[tokio::test]
async fn test_partial_update_merges_over_stored_fields() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let created = service
        .create(
            "Post",
            json!({
                "title": "t",
                "content": "c",
                "tags": ["one"],
                "liked_by": [],
            }),
            "a@example.com",
        )
        .await?;
    let id = created["id"].as_i64().unwrap();

    // A like toggle only sends the changed fields.
    let updated = service
        .update(
            "Post",
            id,
            json!({ "liked_by": ["b@example.com"], "likes_count": 1 }),
        )
        .await?;

    assert_eq!(updated["title"], "t");
    assert_eq!(updated["tags"], json!(["one"]));
    assert_eq!(updated["liked_by"], json!(["b@example.com"]));
    assert_eq!(updated["likes_count"], 1);
    Ok(())
}

#[tokio::test]
async fn test_favorites_are_scoped_to_creator() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    service
        .create("Favorite", json!({ "post_id": 1, "post_title": "p1" }), "a@example.com")
        .await?;
    service
        .create("Favorite", json!({ "post_id": 2, "post_title": "p2" }), "b@example.com")
        .await?;

    let for_a = service.list("Favorite", None, None, "a@example.com").await?;
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0]["created_by"], "a@example.com");

    let for_b = service.list("Favorite", None, None, "b@example.com").await?;
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0]["post_title"], "p2");
    Ok(())
}

#[tokio::test]
async fn test_notifications_are_scoped_to_recipient() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    service
        .create(
            "Notification",
            json!({
                "type": "like",
                "post_id": "3",
                "recipient_email": "a@example.com",
                "actor_email": "b@example.com",
            }),
            "b@example.com",
        )
        .await?;

    let for_a = service.list("Notification", None, None, "a@example.com").await?;
    assert_eq!(for_a.len(), 1);
    // The stringly-typed post id was normalized on the way in.
    assert_eq!(for_a[0]["post_id"], 3);
    // Notifications carry no created_by, so the sender sees nothing.
    let for_b = service.list("Notification", None, None, "b@example.com").await?;
    assert!(for_b.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let err = service.list("Widget", None, None, "a@example.com").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = service
        .create("Widget", json!({}), "a@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_order_limit_and_defensive_parsing() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    for title in ["first", "second", "third"] {
        service
            .create("Post", json!({ "title": title }), "a@example.com")
            .await?;
    }

    let newest = service
        .list("Post", Some("-id"), Some("1"), "a@example.com")
        .await?;
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0]["title"], "third");

    // Callers that stringify missing values must behave as if absent.
    let all = service
        .list("Post", Some("undefined"), Some("null"), "a@example.com")
        .await?;
    assert_eq!(all.len(), 3);

    let empty_params = service.list("Post", Some(""), Some(""), "a@example.com").await?;
    assert_eq!(empty_params.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_create_does_not_override_explicit_creator() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let created = service
        .create(
            "Comment",
            json!({ "post_id": 1, "content": "hi", "created_by": "other@example.com" }),
            "a@example.com",
        )
        .await?;
    assert_eq!(created["created_by"], "other@example.com");
    Ok(())
}

#[tokio::test]
async fn test_shared_style_avatar_is_normalized_on_create() -> Result<(), Error> {
    let db = setup_test_db().await;
    let service = EntityService::new(db.pool().clone());

    let created = service
        .create(
            "Post",
            json!({
                "title": "分享角色",
                "category": "AI Relief",
                "shared_style_id": "5",
                "shared_style_data": {
                    "name": "暖心陪伴",
                    "avatar": "http://localhost:3001/uploads/avatar.png",
                },
            }),
            "a@example.com",
        )
        .await?;

    assert_eq!(created["shared_style_id"], 5);
    assert_eq!(created["shared_style_data"]["avatar"], "/api/uploads/avatar.png");
    Ok(())
}
