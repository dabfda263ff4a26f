//! catalog-api - A small REST backend for a categorized product catalog
//!
//! This crate provides:
//! - Generic CRUD over a closed set of category tables (redb embedded database)
//! - Image upload, listing, serving and deletion on a flat upload directory
//! - A JSON REST API with explicit CORS and request deadlines

pub mod api;
pub mod config;
pub mod object_store;
pub mod service;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use config::Config;
use service::{RecordService, UploadService};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub records: RecordService,
    pub uploads: UploadService,
}
