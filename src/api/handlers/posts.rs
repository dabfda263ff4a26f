use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, AppPath, AppQuery};
use crate::service::{DeleteConfirmation, Post};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    #[serde(default, alias = "category")]
    pub table: Option<String>,
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.records.create(&body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<TableParams>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.records.list(params.table.as_deref()).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppQuery(params): AppQuery<TableParams>,
) -> Result<Json<Post>, ApiError> {
    let post = state.records.get(&id, params.table.as_deref()).await?;
    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<Post>, ApiError> {
    let post = state.records.update(&id, &body).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppQuery(params): AppQuery<TableParams>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let confirmation = state.records.delete(&id, params.table.as_deref()).await?;
    Ok(Json(confirmation))
}
