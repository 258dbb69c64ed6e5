//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::MessageId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for client notices
    pub fn code(&self) -> &'static str {
        match self {
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    /// Check if the failure came from the storage backend
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }
}
