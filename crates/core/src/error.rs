//! Write-model rejection reasons.

use thiserror::Error;

/// Why an inventory item command (or an id) was rejected.
///
/// Only the write side produces these. Projections fold unknown or malformed
/// events permissively and never fail with a `DomainError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Blank item name, non-positive count.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Stock out of bounds or a command addressed to another item.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The item stream has no `Created` event yet.
    #[error("inventory item not found")]
    NotFound,

    /// Item already created or already deactivated.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
