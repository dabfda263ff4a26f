use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ServiceError;
use crate::config::CollisionPolicy;
use crate::object_store::{ObjectStore, StoredObject};

/// URL path under which stored uploads are served back.
pub const PUBLIC_UPLOAD_PREFIX: &str = "/public/uploads";

const MAX_FILENAME_BYTES: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    #[serde(skip)]
    pub filename: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDeletion {
    pub success: bool,
    pub message: String,
}

pub struct ServedFile {
    pub content_type: String,
    pub object: StoredObject,
}

/// Stores uploaded images in a flat namespace.
#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    collision_policy: CollisionPolicy,
    max_upload_size: u64,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        collision_policy: CollisionPolicy,
        max_upload_size: u64,
    ) -> Self {
        Self {
            store,
            collision_policy,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Persist an uploaded image under a timestamp-prefixed name.
    ///
    /// Nothing is written when `data` exceeds the size ceiling or the derived
    /// name is not a valid flat filename.
    pub async fn store_image(
        &self,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredImage, ServiceError> {
        if data.len() as u64 > self.max_upload_size {
            return Err(ServiceError::PayloadTooLarge {
                limit: self.max_upload_size,
            });
        }

        let base = original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() {
            return Err(ServiceError::Validation(
                "uploaded file must have a name".to_string(),
            ));
        }

        let filename = stored_filename(self.collision_policy, Utc::now(), base);
        validate_filename(&filename)?;

        let byte_size = data.len();
        self.store.put(&filename, data).await?;

        tracing::debug!(filename = %filename, byte_size, "Stored upload");
        Ok(StoredImage {
            location: format!("{PUBLIC_UPLOAD_PREFIX}/{filename}"),
            filename,
        })
    }

    /// Names of all stored files, in directory order.
    pub async fn list_files(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn open_file(&self, filename: &str) -> Result<ServedFile, ServiceError> {
        validate_filename(filename)?;
        let object = self.store.open(filename).await?;
        let content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string();
        Ok(ServedFile {
            content_type,
            object,
        })
    }

    /// Delete a stored file. A missing file is reported, not raised.
    pub async fn delete_file(&self, filename: &str) -> Result<FileDeletion, ServiceError> {
        validate_filename(filename)?;

        let outcome = match self.store.delete(filename).await {
            Ok(true) => {
                tracing::debug!(filename = %filename, "Deleted upload");
                FileDeletion {
                    success: true,
                    message: "File deleted successfully".to_string(),
                }
            }
            Ok(false) => FileDeletion {
                success: false,
                message: "File not found".to_string(),
            },
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Failed to delete upload");
                FileDeletion {
                    success: false,
                    message: "Failed to delete file".to_string(),
                }
            }
        };
        Ok(outcome)
    }
}

/// Derive the stored name for an upload received at `now`.
pub fn stored_filename(policy: CollisionPolicy, now: DateTime<Utc>, original: &str) -> String {
    match policy {
        CollisionPolicy::Minute => format!("{}-{original}", now.format("%Y%m%d-%H%M")),
        CollisionPolicy::Unique => {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            format!("{}-{}-{original}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
        }
    }
}

/// Accept only a single flat path component.
pub fn validate_filename(filename: &str) -> Result<(), ServiceError> {
    let invalid = |reason: &str| -> Result<(), ServiceError> {
        Err(ServiceError::Validation(format!("Invalid filename: {reason}")))
    };

    if filename.is_empty() {
        return invalid("must not be empty");
    }
    if filename.len() > MAX_FILENAME_BYTES {
        return invalid("too long");
    }
    if filename.contains(['/', '\\', '\0']) {
        return invalid("must not contain path separators");
    }
    if filename.starts_with('.') {
        return invalid("must not start with '.'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_minute_policy_truncates_seconds() {
        let a = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        let name = stored_filename(CollisionPolicy::Minute, a, "ring.png");
        assert_eq!(name, "20240309-1405-ring.png");
        assert_eq!(name, stored_filename(CollisionPolicy::Minute, b, "ring.png"));
    }

    #[test]
    fn test_unique_policy_never_repeats() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 1).unwrap();
        let a = stored_filename(CollisionPolicy::Unique, now, "ring.png");
        let b = stored_filename(CollisionPolicy::Unique, now, "ring.png");
        assert_ne!(a, b);
        assert!(a.starts_with("20240309-140501-"));
        assert!(a.ends_with("-ring.png"));
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("20240309-1405-ring.png").is_ok());
        assert!(validate_filename("my ring.png").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("..").is_err());
        assert!(validate_filename(".env").is_err());
        assert!(validate_filename("../secret").is_err());
        assert!(validate_filename("a/b.png").is_err());
        assert!(validate_filename("a\\b.png").is_err());
        assert!(validate_filename("a\0b.png").is_err());
        assert!(validate_filename(&"x".repeat(256)).is_err());
    }
}
