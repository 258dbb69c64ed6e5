//! Handler error types

use crate::protocol::ErrorNotice;
use crate::relay::RelayError;
use thiserror::Error;

/// Handler error type
///
/// None of these close the connection; most are reported back as `messageError`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame could not be decoded into a client event
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Event arrived after the connection was closed
    #[error("Connection is closed")]
    ConnectionClosed,

    /// The relay rejected or failed the submission
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl HandlerError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "DECODE_ERROR",
            Self::ConnectionClosed => "CONNECTION_CLOSED",
            Self::Relay(e) => e.code(),
        }
    }

    /// Convert to a notice for the submitting connection (if it can still receive one)
    pub fn to_notice(&self) -> Option<ErrorNotice> {
        match self {
            Self::ConnectionClosed => None,
            Self::Relay(e) => Some(e.to_notice()),
            Self::InvalidPayload(_) => Some(ErrorNotice::new(self.code(), self.to_string())),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
