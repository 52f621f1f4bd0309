//! HTTP endpoint modules. Shared error shape lives here.

mod blobs;
mod decode;
mod generate;
mod health;
mod outline;

use axum::http::StatusCode;
use axum::Json;

use rfpcat_llm::ErrorResponse;

/// Error half of every handler result: status plus `{"error": "..."}`.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

pub use blobs::{delete_blob, get_blob};
pub use decode::decode;
pub use generate::{generate, method_not_allowed};
pub use health::health;
pub use outline::outline;
