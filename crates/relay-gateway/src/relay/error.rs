//! Relay error types

use relay_core::DomainError;
use thiserror::Error;

use crate::protocol::ErrorNotice;

/// Failure of a single submission
///
/// Never fatal to the connection or the process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Submission had no sender; nothing was persisted or emitted
    #[error("Message sender is required")]
    MissingSender,

    /// The store rejected or failed the write or the re-fetch; nothing was emitted
    #[error("Failed to persist message: {0}")]
    Persistence(#[from] DomainError),
}

impl RelayError {
    /// Stable code reported to the submitting client
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSender => "MISSING_SENDER",
            Self::Persistence(e) if e.is_validation() => "VALIDATION_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Check if the failure was caused by the submission itself
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MissingSender => true,
            Self::Persistence(e) => !e.is_infrastructure(),
        }
    }

    /// Build the `messageError` payload for the submitting connection
    pub fn to_notice(&self) -> ErrorNotice {
        ErrorNotice::new(self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::MessageId;

    #[test]
    fn test_error_codes() {
        assert_eq!(RelayError::MissingSender.code(), "MISSING_SENDER");
        assert_eq!(
            RelayError::from(DomainError::ValidationError("content is required".to_string())).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            RelayError::from(DomainError::DatabaseError("down".to_string())).code(),
            "PERSISTENCE_ERROR"
        );
        assert_eq!(
            RelayError::from(DomainError::MessageNotFound(MessageId::new(7))).code(),
            "PERSISTENCE_ERROR"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RelayError::MissingSender.is_client_error());
        assert!(RelayError::from(DomainError::ValidationError("x".to_string())).is_client_error());
        assert!(!RelayError::from(DomainError::DatabaseError("down".to_string())).is_client_error());
    }

    #[test]
    fn test_notice() {
        let notice = RelayError::from(DomainError::MessageNotFound(MessageId::new(7))).to_notice();
        assert_eq!(notice.code, "PERSISTENCE_ERROR");
        assert_eq!(notice.message, "Failed to persist message: Message not found: 7");
    }
}
