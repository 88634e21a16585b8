use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use herald_db::StoreError;
use herald_db::models::data_index;
use herald_types::api::ErrorResponse;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure is reported at the operation boundary; none is fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The index no longer points at a row, e.g. it was deleted meanwhile.
    #[error("no row at index {index} ({len} rows)")]
    NotFound { index: usize, len: usize },

    /// The backing store failed. Surfaced verbatim, never retried.
    #[error("{0:#}")]
    Persistence(anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Persistence(_) => "persistence",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A row the store could not find means our snapshot went stale between the
/// read and the write; anything else is a store failure.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::RowOutOfRange { row, rows, .. }) => Self::NotFound {
                index: data_index(*row).unwrap_or(0),
                len: *rows,
            },
            _ => Self::Persistence(err),
        }
    }
}

/// Unreadable bodies are bad input like any other.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// `Json` whose rejections are reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Persistence(e) = &self {
            error!("Persistence error: {:#}", e);
        }
        (
            self.status(),
            Json(ErrorResponse {
                error: self.kind().to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
