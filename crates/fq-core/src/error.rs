//! # AppError
//!
//! Centralized error handling for the Fabriq ecosystem.
//! Maps domain-specific failures to actionable error types.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// The primary error type for all fq-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., ClothingItem, Outfit)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure, rejected before any store mutation.
    /// Carries the full field-level error list.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Caller is not the owner of the fetched resource. Kept distinct from
    /// `NotFound` so a denial never masquerades as absence.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., DB down, media store unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Fabriq logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
