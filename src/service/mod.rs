//! Record and upload services.
//!
//! Handlers talk only to these services. They own input validation, the
//! category allow-list, upload naming, and the record store query timeout.

mod records;
mod uploads;

pub use records::{DeleteConfirmation, Post, RecordService};
pub use uploads::{
    stored_filename, validate_filename, FileDeletion, ServedFile, StoredImage, UploadService,
    PUBLIC_UPLOAD_PREFIX,
};

use thiserror::Error;

use crate::object_store::ObjectStoreError;
use crate::storage::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("File exceeds maximum upload size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DatabaseError> for ServiceError {
    fn from(e: DatabaseError) -> Self {
        ServiceError::Storage(e.to_string())
    }
}

impl From<ObjectStoreError> for ServiceError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::NotFound(key) => ServiceError::NotFound(format!("File '{key}' not found")),
            ObjectStoreError::Io(e) => ServiceError::Storage(e.to_string()),
        }
    }
}
