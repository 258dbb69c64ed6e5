//! Error handling utilities for repositories

use relay_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Map an insert failure, turning a body CHECK violation into a validation error
pub fn map_insert_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_check_violation() {
            return DomainError::ValidationError(db_err.message().to_string());
        }
    }
    map_db_error(e)
}
