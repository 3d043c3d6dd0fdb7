// Domain errors raised by comment operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// Bad input: empty body or an inverted / non-positive line range.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No comment with the given id exists in the session.
    #[error("comment not found: {0}")]
    NotFound(String),
}

impl ReviewError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}
