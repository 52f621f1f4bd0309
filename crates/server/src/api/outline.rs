//! `POST /api/outline`: table of contents and sanitized body for categorized text.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use rfpcat_core::TocItem;
use rfpcat_outline::HtmlEscaper;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct OutlineRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct OutlineResponse {
    pub toc: Vec<TocItem>,
    pub html: String,
}

pub async fn outline(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OutlineRequest>,
) -> Json<OutlineResponse> {
    let outline = state.parser.parse(&request.text);
    Json(OutlineResponse {
        html: outline.render_body(&HtmlEscaper),
        toc: outline.toc().to_vec(),
    })
}
