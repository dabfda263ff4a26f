use bytes::Bytes;
use catalog_api::object_store::{LocalStore, ObjectStore, ObjectStoreError};
use tokio::io::AsyncReadExt;

async fn read_all(store: &LocalStore, key: &str) -> Vec<u8> {
    let mut object = store.open(key).await.unwrap();
    let mut buf = Vec::new();
    object.reader.read_to_end(&mut buf).await.unwrap();
    assert_eq!(object.byte_size, buf.len() as u64);
    buf
}

#[tokio::test]
async fn test_local_store_put_open() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("ring.png", Bytes::from("hello world")).await.unwrap();
    assert_eq!(read_all(&store, "ring.png").await, b"hello world");
}

#[tokio::test]
async fn test_local_store_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().join("public").join("uploads");
    let store = LocalStore::new(&upload_dir).unwrap();
    assert!(upload_dir.is_dir());

    // Recreated on write if removed after startup
    std::fs::remove_dir(&upload_dir).unwrap();
    store.put("a.png", Bytes::from("a")).await.unwrap();
    assert!(upload_dir.join("a.png").is_file());
}

#[tokio::test]
async fn test_local_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("to-delete", Bytes::from("data")).await.unwrap();
    assert!(store.delete("to-delete").await.unwrap());
    assert!(matches!(
        store.open("to-delete").await,
        Err(ObjectStoreError::NotFound(_))
    ));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_store_delete_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    // Deleting a nonexistent key reports false rather than erroring
    assert!(!store.delete("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_local_store_open_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let result = store.open("missing").await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_local_store_list_skips_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("a.png", Bytes::from("a")).await.unwrap();
    store.put("b.jpg", Bytes::from("b")).await.unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let mut names = store.list().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["a.png".to_string(), "b.jpg".to_string()]);
}

#[tokio::test]
async fn test_local_store_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("key", Bytes::from("first")).await.unwrap();
    store.put("key", Bytes::from("second")).await.unwrap();

    assert_eq!(read_all(&store, "key").await, b"second");
}
