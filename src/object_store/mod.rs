mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// An object opened for streaming.
pub struct StoredObject {
    pub byte_size: u64,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

/// Abstraction over a flat namespace of uploaded blobs.
/// Keys are final stored filenames and must already be validated by the caller.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    async fn open(&self, key: &str) -> Result<StoredObject, ObjectStoreError>;
    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, key: &str) -> Result<bool, ObjectStoreError>;
    async fn list(&self) -> Result<Vec<String>, ObjectStoreError>;
}
