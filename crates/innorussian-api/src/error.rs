//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use innorussian_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthorized,

  #[error("staff account required")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("gone: {0}")]
  Gone(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("media error: {0}")]
  Media(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::CategoryNotFound(_)
      | CoreError::SubCategoryNotFound(_)
      | CoreError::CardNotFound(_)
      | CoreError::UserNotFound(_) => ApiError::NotFound(e.to_string()),
      CoreError::Unauthorized => ApiError::Unauthorized,
      CoreError::AlreadyFavourite(_)
      | CoreError::DuplicateName(_)
      | CoreError::DuplicateEmail(_) => ApiError::Conflict(e.to_string()),
      CoreError::NotFavourite(_) => ApiError::Gone(e.to_string()),
      CoreError::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl ApiError {
  /// Convert a backend error, keeping domain failures distinguishable.
  pub fn store<E: Into<CoreError>>(e: E) -> Self { ApiError::from(e.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Gone(_) => StatusCode::GONE,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Media(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"innorussian\""),
      );
    }
    res
  }
}
