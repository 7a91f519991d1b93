//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is raised before any state is changed: an operation either
/// fully succeeds or leaves the product exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input contract violation (non-positive quantity, negative unit cost, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A sale asked for more units than the product's batches hold.
    #[error("insufficient inventory (requested: {requested}, available: {available})")]
    InsufficientInventory { requested: u64, available: u64 },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn insufficient_inventory(requested: u64, available: u64) -> Self {
        Self::InsufficientInventory {
            requested,
            available,
        }
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

    /// True for errors the caller can fix by changing its request.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperation(_) | Self::InsufficientInventory { .. } | Self::InvalidId(_)
        )
    }
}
