//! HTTP mapping for domain errors.
//!
//! The body shape matches what the frontend already consumes:
//! `{ "error": { "code", "message", "fields"? } }`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fq_core::error::AppError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No caller identity on the request. Distinct from `Forbidden`, which
    /// means an identified caller touching someone else's resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    pub fn unauthorized(message: &str) -> Self {
        ApiError::Unauthorized(message.to_string())
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::App(AppError::NotFound(..)) => "NOT_FOUND",
            ApiError::App(AppError::Validation(_)) => "VALIDATION_ERROR",
            ApiError::App(AppError::Forbidden(_)) => "FORBIDDEN",
            ApiError::App(AppError::Internal(_)) => "INTERNAL_ERROR",
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::App(AppError::Internal(err.to_string()))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::App(AppError::NotFound(..)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::App(AppError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::App(AppError::Internal(message)) = self {
            log::error!("internal error: {message}");
        }
        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let ApiError::App(AppError::Validation(fields)) = self {
            error["fields"] = json!(fields);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": error }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fq_core::error::FieldError;

    #[test]
    fn status_codes_keep_forbidden_and_not_found_apart() {
        let forbidden = ApiError::App(AppError::Forbidden("nope".into()));
        let missing = ApiError::App(AppError::NotFound("outfit".into(), "x".into()));
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_response_lists_fields() {
        let err = ApiError::App(AppError::Validation(vec![FieldError::new(
            "name",
            "outfit name must not be empty",
        )]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
