use std::time::{Duration, Instant};

use catalog_api::storage::{Category, Database, DatabaseError, RecordFields};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn fields(title: &str, content: &str) -> RecordFields {
    RecordFields {
        title: title.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn test_insert_and_get_record() {
    let (_dir, db) = test_db();

    let record = db
        .insert_record(Category::Bracelets, &fields("Sun", "gold"), None)
        .unwrap();
    assert_eq!(record.id, 1);

    let retrieved = db
        .get_record(Category::Bracelets, record.id)
        .unwrap()
        .expect("record should exist");
    assert_eq!(retrieved, record);
    assert_eq!(retrieved.title, "Sun");
    assert_eq!(retrieved.content, "gold");
}

#[test]
fn test_get_record_not_found() {
    let (_dir, db) = test_db();
    assert!(db.get_record(Category::Beads, 1).unwrap().is_none());
}

#[test]
fn test_categories_are_isolated() {
    let (_dir, db) = test_db();
    let bag = db.insert_record(Category::Bags, &fields("Tote", "canvas"), None).unwrap();
    let necklace = db
        .insert_record(Category::Necklace, &fields("Pearl", "white"), None)
        .unwrap();

    // Ids are assigned per category
    assert_eq!(bag.id, 1);
    assert_eq!(necklace.id, 1);

    assert_eq!(
        db.get_record(Category::Bags, 1).unwrap().unwrap().title,
        "Tote"
    );
    assert_eq!(
        db.get_record(Category::Necklace, 1).unwrap().unwrap().title,
        "Pearl"
    );
    assert!(db.list_records(Category::Covers).unwrap().is_empty());
}

#[test]
fn test_ids_are_not_reused_after_delete() {
    let (_dir, db) = test_db();
    let first = db.insert_record(Category::Form, &fields("a", "a"), None).unwrap();
    assert!(db.delete_record(Category::Form, first.id, None).unwrap());

    let second = db.insert_record(Category::Form, &fields("b", "b"), None).unwrap();
    assert_eq!(second.id, first.id + 1);
}

#[test]
fn test_list_records_in_id_order() {
    let (_dir, db) = test_db();
    for title in ["one", "two", "three"] {
        db.insert_record(Category::Lookbook, &fields(title, "x"), None).unwrap();
    }

    let records = db.list_records(Category::Lookbook).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["one", "two", "three"]);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_update_record_keeps_created_at() {
    let (_dir, db) = test_db();
    let original = db
        .insert_record(Category::Chokers, &fields("Old", "old"), None)
        .unwrap();

    let returned = db
        .update_record(Category::Chokers, original.id, &fields("New", "new"), None)
        .unwrap()
        .expect("record should exist");

    let updated = db.get_record(Category::Chokers, original.id).unwrap().unwrap();
    assert_eq!(returned, updated);
    assert_eq!(updated.title, "New");
    assert_eq!(updated.content, "new");
    assert_eq!(updated.created_at, original.created_at);
}

#[test]
fn test_update_record_not_found() {
    let (_dir, db) = test_db();
    assert!(db
        .update_record(Category::Chokers, 5, &fields("x", "y"), None)
        .unwrap()
        .is_none());
    assert!(db.get_record(Category::Chokers, 5).unwrap().is_none());
}

#[test]
fn test_delete_record() {
    let (_dir, db) = test_db();
    let record = db
        .insert_record(Category::FriendshipBracelets, &fields("Knot", "red"), None)
        .unwrap();

    assert!(db
        .delete_record(Category::FriendshipBracelets, record.id, None)
        .unwrap());
    assert!(db
        .get_record(Category::FriendshipBracelets, record.id)
        .unwrap()
        .is_none());
    assert!(!db
        .delete_record(Category::FriendshipBracelets, record.id, None)
        .unwrap());
}

#[test]
fn test_reopen_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    {
        let db = Database::open(&data_dir).unwrap();
        db.insert_record(Category::BodyChain, &fields("Chain", "silver"), None)
            .unwrap();
    }

    let db = Database::open(&data_dir).unwrap();
    let records = db.list_records(Category::BodyChain).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Chain");

    let next = db.insert_record(Category::BodyChain, &fields("Second", "x"), None).unwrap();
    assert_eq!(next.id, 2);
}

#[test]
fn test_category_names_round_trip() {
    for category in Category::ALL {
        let parsed: Category = category.as_str().parse().unwrap();
        assert_eq!(parsed, category);
    }
    assert!("posts".parse::<Category>().is_err());
    assert_eq!(Category::FriendshipBracelets.to_string(), "friendship_bracelets");
}

#[test]
fn test_expired_deadline_writes_nothing() {
    let (_dir, db) = test_db();
    let kept = db.insert_record(Category::Bags, &fields("Tote", "canvas"), None).unwrap();
    let expired = Some(Instant::now() - Duration::from_millis(1));

    assert!(matches!(
        db.insert_record(Category::Bags, &fields("Late", "x"), expired),
        Err(DatabaseError::DeadlineExceeded)
    ));
    assert!(matches!(
        db.update_record(Category::Bags, kept.id, &fields("Late", "x"), expired),
        Err(DatabaseError::DeadlineExceeded)
    ));
    assert!(matches!(
        db.delete_record(Category::Bags, kept.id, expired),
        Err(DatabaseError::DeadlineExceeded)
    ));

    let records = db.list_records(Category::Bags).unwrap();
    assert_eq!(records, vec![kept.clone()]);

    // The aborted insert did not advance the id sequence
    let next = db.insert_record(Category::Bags, &fields("Clutch", "y"), None).unwrap();
    assert_eq!(next.id, kept.id + 1);
}

#[test]
fn test_future_deadline_commits() {
    let (_dir, db) = test_db();
    let deadline = Some(Instant::now() + Duration::from_secs(60));
    let record = db
        .insert_record(Category::Covers, &fields("Cover", "c"), deadline)
        .unwrap();
    assert!(db.get_record(Category::Covers, record.id).unwrap().is_some());
}
