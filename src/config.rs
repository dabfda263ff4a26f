use std::str::FromStr;

use thiserror::Error;

use crate::storage::Category;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    /// Category read by `GET /api/posts` when the request names none.
    pub default_category: Category,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Explicit CORS allow-list. A single `*` entry allows any origin.
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Upper bound for a single record store call
    pub query_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub collision_policy: CollisionPolicy,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    pub upload_dir: String,
}

/// How stored filenames are derived from the uploaded name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// `<YYYYMMDD-HHMM>-<name>`: same name within a minute overwrites.
    Minute,
    /// Seconds plus a random suffix: stored names never collide.
    Unique,
}

impl FromStr for CollisionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minute" => Ok(CollisionPolicy::Minute),
            "unique" => Ok(CollisionPolicy::Unique),
            other => Err(ConfigError::ValidationError(format!(
                "UPLOAD_COLLISION_POLICY must be 'minute' or 'unique', got '{other}'"
            ))),
        }
    }
}

pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024; // 5MB
/// Largest accepted MAX_UPLOAD_SIZE. Uploads are buffered in memory.
pub const MAX_UPLOAD_SIZE_LIMIT: u64 = 1024 * 1024 * 1024; // 1GB

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            query_timeout_ms: 5000,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::Unique,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            upload_dir: "./public/uploads".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let server_defaults = ServerConfig::default();
        let storage_defaults = StorageConfig::default();
        let upload_defaults = UploadConfig::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(server_defaults.allowed_origins);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(server_defaults.request_timeout_secs);

        let data_dir = std::env::var("DATA_DIR").unwrap_or(storage_defaults.data_dir);

        let query_timeout_ms = std::env::var("QUERY_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(storage_defaults.query_timeout_ms);

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or(upload_defaults.upload_dir);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(upload_defaults.max_upload_size);

        let collision_policy = match std::env::var("UPLOAD_COLLISION_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => upload_defaults.collision_policy,
        };

        let default_category = match std::env::var("DEFAULT_CATEGORY") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("DEFAULT_CATEGORY: {e}")))?,
            Err(_) => Category::Form,
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                allowed_origins,
                request_timeout_secs,
            },
            storage: StorageConfig {
                data_dir,
                query_timeout_ms,
            },
            uploads: UploadConfig {
                collision_policy,
                max_upload_size,
                upload_dir,
            },
            default_category,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uploads.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.uploads.max_upload_size > MAX_UPLOAD_SIZE_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "MAX_UPLOAD_SIZE must be at most {MAX_UPLOAD_SIZE_LIMIT} bytes"
            )));
        }

        if self.server.request_timeout_secs == 0 || self.storage.query_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "REQUEST_TIMEOUT_SECS and QUERY_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        if self.server.allowed_origins.iter().any(|o| o == "*") {
            tracing::warn!("ALLOWED_ORIGINS contains '*'. Any origin may call the API.");
        }

        Ok(())
    }

    /// Whether CORS should allow any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.server.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
