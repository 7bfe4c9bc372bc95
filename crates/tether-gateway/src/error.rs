use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tether_core::{RedirectorError, ShortenerError};
use tracing::{error, warn};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cannot parse request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Redirector(#[from] RedirectorError),
    /// The stored target cannot be sent as a `Location` header.
    #[error("stored target for '{0}' is not a valid redirect location")]
    InvalidTarget(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(e) => match e {
                ShortenerError::BadInput(_) => StatusCode::BAD_REQUEST,
                ShortenerError::Forbidden(_) => StatusCode::FORBIDDEN,
                ShortenerError::Conflict(_) => StatusCode::CONFLICT,
                ShortenerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Redirector(e) => match e {
                RedirectorError::NotFound(_) => StatusCode::NOT_FOUND,
                RedirectorError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::InvalidTarget(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to clients. Store details stay in the logs.
    fn public_message(&self) -> String {
        match self.status() {
            StatusCode::SERVICE_UNAVAILABLE => "unable to reach the link store".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
