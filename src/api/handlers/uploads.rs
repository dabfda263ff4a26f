use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::response::{ApiError, AppPath};
use crate::service::{FileDeletion, ServiceError, StoredImage};
use crate::AppState;

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredImage>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(format!("Invalid multipart form data: {e}")))?;
    let limit = state.uploads.max_upload_size();
    let mut image: Option<(String, Bytes)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        if image.is_some() {
            return Err(ApiError::bad_request("only one image may be uploaded per request"));
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("image field must be a file"))?;

        // Stop reading as soon as the ceiling is crossed so nothing oversized is buffered.
        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if (buf.len() + chunk.len()) as u64 > limit {
                return Err(ServiceError::PayloadTooLarge { limit }.into());
            }
            buf.extend_from_slice(&chunk);
        }
        image = Some((file_name, buf.freeze()));
    }

    let (file_name, data) =
        image.ok_or_else(|| ApiError::bad_request("image field is required"))?;
    let stored = state.uploads.store_image(&file_name, data).await?;
    Ok(Json(stored))
}

pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.uploads.list_files().await?))
}

/// Stream a stored upload.
/// Routes: GET /api/uploads/:filename, GET /public/uploads/:filename
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    AppPath(filename): AppPath<String>,
) -> Result<Response, ApiError> {
    let served = state.uploads.open_file(&filename).await?;

    let body = Body::from_stream(ReaderStream::new(served.object.reader));
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        served
            .content_type
            .parse()
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(served.object.byte_size),
    );

    Ok(response)
}

pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    AppPath(filename): AppPath<String>,
) -> Result<Json<FileDeletion>, ApiError> {
    Ok(Json(state.uploads.delete_file(&filename).await?))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(e.body_text())
    } else {
        ApiError::bad_request(format!("Invalid multipart form data: {}", e.body_text()))
    }
}
