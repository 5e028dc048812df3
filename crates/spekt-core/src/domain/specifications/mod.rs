//! Specification and verification types
//!
//! A verification is a named bag of filter clauses answering existence
//! questions. A specification is its superset, adding ordering, eager-load
//! paths, grouping, a row cap, and consistency/fetch-strategy toggles.
//! Both are constructed once through builders and frozen; the query
//! composer never sees a mutating specification.

pub mod projecting;
pub mod specification;
pub mod verification;

pub use projecting::ProjectingSpecification;
pub use specification::{Specification, SpecificationBuilder};
pub use verification::{Verification, VerificationBuilder};

use crate::domain::value_objects::FilterClause;

/// Capability shared by verifications and specifications: an AND-combined,
/// insertion-ordered list of filter clauses. The composer is generic over
/// this trait rather than over a base type.
pub trait Filterable<E> {
    /// Name used in failure messages and logs
    fn name(&self) -> &str;

    /// Filter clauses in insertion order
    fn filters(&self) -> &[FilterClause<E>];

    /// Whether one entity satisfies every filter clause
    fn is_satisfied_by(&self, entity: &E) -> bool {
        self.filters().iter().all(|clause| clause.matches(entity))
    }
}
