//! `POST /api/decode`: multipart upload, one decoded entry per file part.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use rfpcat_core::DecodedFile;
use rfpcat_ingest::document::guess_content_type;
use rfpcat_ingest::RawFile;

use super::{api_error, ApiError};
use crate::state::AppState;

pub async fn decode(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Vec<DecodedFile>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Multipart error: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "skipping non-file multipart field");
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(Path::new(&name)));
        let bytes = field.bytes().await.map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Failed to read {name}: {e}"))
        })?;
        files.push(RawFile::new(name, content_type, bytes));
    }

    if files.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No file provided"));
    }

    info!(files = files.len(), "decoding upload");
    Ok(Json(state.decoder.decode_batch(files).await))
}
