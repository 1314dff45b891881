//! Database tests

use super::*;
use tempfile::TempDir;
use url::Url;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_activity_add_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let activity = Activity::new(url("https://example.com/activities/1"), "Create")
        .with_actor(url("https://example.com/services/orb"))
        .with_object(serde_json::json!({"id": "https://example.com/obj/1", "type": "Note"}));

    db.add_activity(&activity).await.unwrap();

    let retrieved = db.get_activity(&activity.id).await.unwrap();
    assert_eq!(retrieved, Some(activity));

    let missing = db
        .get_activity(&url("https://example.com/activities/2"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_activity_add_replaces_existing() {
    let (db, _temp_dir) = create_test_db().await;

    let id = url("https://example.com/activities/1");
    db.add_activity(&Activity::new(id.clone(), "Create"))
        .await
        .unwrap();
    db.add_activity(&Activity::new(id.clone(), "Update"))
        .await
        .unwrap();

    let retrieved = db.get_activity(&id).await.unwrap().unwrap();
    assert_eq!(retrieved.activity_type, "Update");
}

#[tokio::test]
async fn test_references_paging() {
    let (db, _temp_dir) = create_test_db().await;
    let owner = url("https://example.com/services/orb");
    let other = url("https://example.com/services/other");

    for i in 0..19 {
        db.add_reference(
            ReferenceType::Outbox,
            &owner,
            &url(&format!("https://activity_{i}")),
        )
        .await
        .unwrap();
    }
    db.add_reference(ReferenceType::Outbox, &other, &url("https://activity_x"))
        .await
        .unwrap();
    db.add_reference(ReferenceType::Inbox, &owner, &url("https://activity_y"))
        .await
        .unwrap();

    assert_eq!(
        db.count_references(ReferenceType::Outbox, &owner)
            .await
            .unwrap(),
        19
    );

    let newest = db
        .references_before(ReferenceType::Outbox, &owner, 19, 4)
        .await
        .unwrap();
    assert_eq!(
        newest,
        vec![
            url("https://activity_18"),
            url("https://activity_17"),
            url("https://activity_16"),
            url("https://activity_15"),
        ]
    );

    let oldest = db
        .references_before(ReferenceType::Outbox, &owner, 3, 4)
        .await
        .unwrap();
    assert_eq!(
        oldest,
        vec![
            url("https://activity_2"),
            url("https://activity_1"),
            url("https://activity_0"),
        ]
    );

    let none = db
        .references_before(ReferenceType::Share, &owner, 10, 4)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_accept_list_update_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let domain1 = url("https://domain1.com");
    let domain2 = url("https://domain2.com");
    let domain3 = url("https://domain3.com");

    db.update("follow", &[domain1.clone(), domain2.clone()], &[])
        .await
        .unwrap();
    // Re-adding and removing absent entries are no-ops
    db.update("follow", &[domain1.clone()], &[domain3.clone()])
        .await
        .unwrap();
    db.update("invite-witness", &[domain3.clone()], &[])
        .await
        .unwrap();

    assert_eq!(
        db.get("follow").await.unwrap(),
        vec![domain1.clone(), domain2.clone()]
    );
    assert!(db.get("unknown").await.unwrap().is_empty());

    db.update("follow", &[], &[domain2.clone()]).await.unwrap();

    let all = db.get_all().await.unwrap();
    assert_eq!(
        all,
        vec![
            AcceptList {
                accept_type: "follow".to_string(),
                urls: vec![domain1],
            },
            AcceptList {
                accept_type: "invite-witness".to_string(),
                urls: vec![domain3],
            },
        ]
    );
}
