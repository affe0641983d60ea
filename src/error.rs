//! Error taxonomy for the API.
//!
//! Every failure crossing an HTTP boundary is one of these variants, and
//! every endpoint serializes it to the canonical envelope
//! `{"success": false, "error": "..."}`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed input. Never retried.
    Validation(String),
    /// Unknown handle/profile/resource. Never retried.
    NotFound(String),
    /// Bad secret key, bad admin signature, or missing auth token.
    Unauthorized(String),
    /// Too many requests; the client should back off.
    RateLimited(String),
    /// Database failure. Logged, not retried automatically.
    Persistence(String),
    /// Twitter-data / chain / generation provider failure.
    ExternalService(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::Unauthorized(m)
            | ApiError::RateLimited(m)
            | ApiError::Persistence(m)
            | ApiError::ExternalService(m) => m,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Persistence(format!("Database error: {}", e))
    }
}

/// Canonical error envelope shared by all endpoints
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Persistence(_) | ApiError::ExternalService(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, ApiError::Persistence(_) | ApiError::ExternalService(_)) {
            log::error!("{}", self.message());
        }
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            error: self.message().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Persistence("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::ExternalService("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlite_error_maps_to_persistence() {
        let err: ApiError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, ApiError::Persistence(_)));
    }
}
