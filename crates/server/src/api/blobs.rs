//! Image bytes behind the `blob:<uuid>` references in decoded files.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use super::{api_error, ApiError};
use crate::state::AppState;

pub async fn get_blob(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let blob = state
        .blobs()
        .get(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Not Found"))?;
    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes))
}

pub async fn delete_blob(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.blobs().release(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "Not Found"))
    }
}
