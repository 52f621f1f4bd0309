//! `POST /api/generate?endpoint=categorize`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use rfpcat_llm::categorize::CATEGORIZE_FAILED;
use rfpcat_llm::{CategorizeError, CategorizeRequest, CategorizeResponse};

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateQuery {
    pub endpoint: Option<String>,
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
    body: Bytes,
) -> Result<Json<CategorizeResponse>, ApiError> {
    if query.endpoint.as_deref() != Some("categorize") {
        return Err(api_error(StatusCode::NOT_FOUND, "Not Found"));
    }

    let request: CategorizeRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid request body: {e}")))?;

    let categorizer = state.categorizer.as_ref().ok_or_else(|| {
        api_error(StatusCode::SERVICE_UNAVAILABLE, "No LLM provider configured")
    })?;

    match categorizer.categorize(&request.rfp_text).await {
        Ok(categorized_rfp) => {
            info!(chars = categorized_rfp.len(), "categorized RFP");
            Ok(Json(CategorizeResponse { categorized_rfp }))
        }
        Err(CategorizeError::EmptyInput) => Err(api_error(
            StatusCode::BAD_REQUEST,
            CategorizeError::EmptyInput.to_string(),
        )),
        Err(e) => {
            error!(error = %e, "Error categorizing RFP");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, CATEGORIZE_FAILED))
        }
    }
}

/// Any method other than POST.
pub async fn method_not_allowed(method: Method) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {method} Not Allowed"),
    )
}
