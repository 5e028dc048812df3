//! Error types for repository and query operations

use tokio_util::sync::CancellationToken;

/// Result type alias for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Main error type for repository operations
///
/// Every read and write operation returns either a value or exactly one of
/// these failures. The query composer itself never fails; errors surface only
/// when a composed query is executed against a store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// A query required exactly one row and matched zero
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// The target of a delete or update does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more batch verification expectations did not hold.
    /// Carries every mismatch message, not just the first.
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationAggregate(Vec<String>),

    /// Cooperative cancellation fired before the operation completed
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Pass-through of the underlying store's own failure; never retried here
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures owned by the underlying store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness or integrity constraint was violated
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Concurrent writers conflicted on the same row
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// A single-row query matched more than one row
    #[error("Query returned more than one row: {0}")]
    NonUniqueResult(String),

    /// No stored routine is registered under the requested name
    #[error("Stored procedure not found: {0}")]
    ProcedureNotFound(String),

    /// Opaque backend failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Create an empty-result error
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    /// Check whether the error is a missing-data outcome rather than a fault
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::EmptyResult(_) | Self::NotFound(_))
    }

    /// Check whether the error came from cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Check whether the error passed through from the store
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Get error category as string
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyResult(_) => "empty-result",
            Self::NotFound(_) => "not-found",
            Self::ValidationAggregate(_) => "validation",
            Self::Cancelled(_) => "cancelled",
            Self::Store(_) => "store",
        }
    }
}

impl StoreError {
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation(message.into())
    }

    pub fn concurrency_conflict(message: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(message.into())
    }

    pub fn non_unique(message: impl Into<String>) -> Self {
        Self::NonUniqueResult(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Bail out with a `Cancelled` error if the token has already fired.
///
/// Checked at the start of every store round-trip so cancellation is honored
/// end-to-end rather than only between operations.
pub(crate) fn guard_cancelled(token: &CancellationToken, operation: &str) -> RepositoryResult<()> {
    if token.is_cancelled() {
        Err(RepositoryError::cancelled(operation.to_string()))
    } else {
        Ok(())
    }
}
