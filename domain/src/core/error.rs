//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Registry misuse (`DuplicateId`, `NotFound`) and caller input problems
/// (`InvalidQuery`) are surfaced directly; nothing at this level is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No succeeded hypotheses to reduce")]
    NoSucceededHypotheses,

    #[error("Hypothesis {id} is already {from}, cannot transition")]
    InvalidTransition { id: String, from: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Errors caused by the caller's input rather than by runtime conditions
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidQuery(_) | DomainError::DuplicateId(_) | DomainError::NotFound(_)
        )
    }
}
