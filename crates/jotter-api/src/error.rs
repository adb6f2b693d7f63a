use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use jotter_types::api::StatusResponse;

use crate::token::TokenError;

/// Every failure a route can answer with. The `Display` text is what the
/// client sees in `message`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("User already exists.")]
    DuplicateEmail,

    #[error("No changes provided.")]
    NoChanges,

    #[error("Search query is required.")]
    MissingQuery,

    #[error("Invalid request: {0}")]
    MalformedBody(String),

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("{0}")]
    UserNotFound(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    /// Store, signing or runtime failure. Logged, never shown.
    #[error("Internal server error.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidInput(_)
            | ApiError::DuplicateEmail
            | ApiError::NoChanges
            | ApiError::MissingQuery
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UserNotFound(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) | TokenError::Expired => ApiError::Unauthorized,
            TokenError::Signing(_) => ApiError::Internal(err.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            error!("Request failed: {:#}", source);
        }

        let status = self.status_code();
        (status, Json(StatusResponse::failed(self.to_string()))).into_response()
    }
}
