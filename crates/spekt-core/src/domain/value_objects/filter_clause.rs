//! Filter clause value object

use std::fmt;
use std::sync::Arc;

/// A single predicate over one entity type.
///
/// Clauses are immutable once created. A specification combines its filter
/// clauses by logical AND, in insertion order.
pub struct FilterClause<E> {
    predicate: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> FilterClause<E> {
    /// Create a clause from a predicate
    pub fn new(predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the predicate against one entity
    pub fn matches(&self, entity: &E) -> bool {
        (self.predicate)(entity)
    }
}

impl<E> Clone for FilterClause<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for FilterClause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterClause").finish_non_exhaustive()
    }
}
