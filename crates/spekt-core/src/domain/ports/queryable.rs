//! Composable query source port

use crate::domain::value_objects::{
    ConsistencyMode, FetchStrategy, FilterClause, GroupKey, IncludePath, OrderClause,
};

/// A composable query source over one entity type.
///
/// The query composer augments a source by consuming and returning it,
/// builder-style. Implementations must treat every method as a pure
/// accumulation; nothing here touches the store.
pub trait Queryable<E>: Sized {
    /// Restrict the result set; successive filters are AND-combined
    fn filter(self, clause: FilterClause<E>) -> Self;

    /// Establish a fresh primary sort, discarding any previous ordering
    fn order_by(self, clause: OrderClause<E>) -> Self;

    /// Chain a secondary sort onto the existing ordering
    fn then_by(self, clause: OrderClause<E>) -> Self;

    /// Eager-load a related path alongside the main result set
    fn include(self, path: IncludePath) -> Self;

    /// Group by the key and flatten back, keeping each group's first row
    fn dedup_by(self, key: GroupKey<E>) -> Self;

    /// Cap the number of rows returned after all other clauses
    fn take(self, cap: usize) -> Self;

    /// Choose single vs split eager-load execution
    fn fetch(self, strategy: FetchStrategy) -> Self;

    /// Choose the tracking policy; applied last so it sees the final query shape
    fn consistency(self, mode: ConsistencyMode) -> Self;
}
