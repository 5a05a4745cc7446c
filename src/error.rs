use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, RelayError>;

/// Failures a publish or room request can surface to its caller.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("invalid request: {0}")]
    Validation(String),
}

impl RelayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{self}");
        }

        (status, self.to_string()).into_response()
    }
}
