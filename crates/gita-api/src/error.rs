//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{FromRequest, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const VERSE_NOT_FOUND: &str = "Verse not found";
pub const DUPLICATE_VERSE: &str = "Verse already exists with this chapter and verse number";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed on {field}: {message}")]
  Validation { field: String, message: String },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn verse_not_found() -> Self { Self::NotFound(VERSE_NOT_FOUND.into()) }
}

impl From<gita_core::Error> for ApiError {
  fn from(e: gita_core::Error) -> Self {
    use gita_core::Error as E;
    match e {
      E::Validation { field, message } => Self::Validation { field, message },
      E::Duplicate { .. } => Self::Conflict(DUPLICATE_VERSE.into()),
      E::InvalidArgument(m) => Self::BadRequest(m),
      E::Store(inner) => Self::Store(inner),
      other @ E::Serialization(_) => Self::Store(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

/// [`Json`] whose rejections are reported as [`ApiError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Validation { field, message } => (
        StatusCode::BAD_REQUEST,
        json!({ "error": message, "field": field }),
      ),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "store error" }))
      }
    };
    (status, Json(body)).into_response()
  }
}
