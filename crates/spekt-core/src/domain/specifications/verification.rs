//! Existence-only specifications

use crate::domain::specifications::Filterable;
use crate::domain::value_objects::FilterClause;
use std::fmt;

/// A named bag of filter clauses answering yes/no existence questions.
///
/// Never carries ordering, eager-load paths, grouping or projection; the
/// composer may issue a deterministic fallback order on its behalf, but that
/// is not state the verification owns.
pub struct Verification<E> {
    name: String,
    filters: Vec<FilterClause<E>>,
}

impl<E> Verification<E> {
    /// Start building a verification
    pub fn builder(name: impl Into<String>) -> VerificationBuilder<E> {
        VerificationBuilder {
            name: name.into(),
            filters: Vec::new(),
        }
    }
}

impl<E> Filterable<E> for Verification<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[FilterClause<E>] {
        &self.filters
    }
}

impl<E> Clone for Verification<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            filters: self.filters.clone(),
        }
    }
}

impl<E> fmt::Debug for Verification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verification")
            .field("name", &self.name)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Builder for [`Verification`]; the result is immutable.
pub struct VerificationBuilder<E> {
    name: String,
    filters: Vec<FilterClause<E>>,
}

impl<E> VerificationBuilder<E> {
    /// Add a filter clause; clauses are AND-combined in insertion order
    pub fn filter(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(FilterClause::new(predicate));
        self
    }

    pub fn build(self) -> Verification<E> {
        Verification {
            name: self.name,
            filters: self.filters,
        }
    }
}
