//! Shared test helpers for catalog-api tests.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ServerConfig, StorageConfig, UploadConfig};
use crate::object_store::LocalStore;
use crate::service::{RecordService, UploadService};
use crate::storage::{Category, Database};
use crate::AppState;

/// Create a test AppState with a temporary database and upload directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state_with(temp_dir, |_| {})
}

/// Like [`test_state`], letting the caller adjust the config first.
pub fn test_state_with(
    temp_dir: &tempfile::TempDir,
    customize: impl FnOnce(&mut Config),
) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let upload_dir = temp_dir.path().join("uploads");

    let mut config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            ..Default::default()
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            ..Default::default()
        },
        uploads: UploadConfig {
            upload_dir: upload_dir.to_string_lossy().to_string(),
            max_upload_size: 1024, // 1KB for tests
            ..Default::default()
        },
        default_category: Category::Form,
    };
    customize(&mut config);

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let store = LocalStore::new(&upload_dir).expect("Failed to create test upload directory");

    let records = RecordService::new(
        db,
        config.default_category,
        Duration::from_millis(config.storage.query_timeout_ms),
    );
    let uploads = UploadService::new(
        Arc::new(store),
        config.uploads.collision_policy,
        config.uploads.max_upload_size,
    );

    Arc::new(AppState {
        config,
        records,
        uploads,
    })
}
