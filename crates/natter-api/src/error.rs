//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use natter_core::error::find_core_error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain failure it wraps, if any.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    use natter_core::Error as Core;

    let classified = match find_core_error(&err) {
      Some(Core::CommentNotFound(id)) => {
        Some(ApiError::NotFound(format!("comment {id} not found")))
      }
      Some(Core::ParentNotFound(id)) => {
        Some(ApiError::NotFound(format!("parent comment {id} not found")))
      }
      Some(e @ (Core::EmptyContent | Core::EntityMismatch { .. })) => {
        Some(ApiError::BadRequest(e.to_string()))
      }
      _ => None,
    };
    classified.unwrap_or_else(|| ApiError::Store(Box::new(err)))
  }
}

// Malformed bodies and query strings get the same JSON envelope as every
// other failure.

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
