//! Canonical query plan

use crate::domain::ports::Queryable;
use crate::domain::value_objects::{
    ConsistencyMode, FetchStrategy, FilterClause, GroupKey, IncludePath, OrderClause,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Accumulated clauses for one query, in application order.
///
/// This is the [`Queryable`] implementation store sessions execute. A real
/// database adapter would translate the recorded clauses into its native
/// query; the in-memory adapter runs [`QueryPlan::evaluate`] directly.
pub struct QueryPlan<E> {
    filters: Vec<FilterClause<E>>,
    orders: Vec<OrderClause<E>>,
    includes: Vec<IncludePath>,
    group: Option<GroupKey<E>>,
    cap: Option<usize>,
    fetch: FetchStrategy,
    consistency: ConsistencyMode,
}

impl<E> QueryPlan<E> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            orders: Vec::new(),
            includes: Vec::new(),
            group: None,
            cap: None,
            fetch: FetchStrategy::default(),
            consistency: ConsistencyMode::default(),
        }
    }

    /// Tighten the row cap to at most `cap`, never widening a caller's cap.
    /// Used by single/first/existence fetches to bound their probes.
    pub fn cap_at_most(mut self, cap: usize) -> Self {
        self.cap = Some(self.cap.map_or(cap, |existing| existing.min(cap)));
        self
    }

    pub fn row_cap(&self) -> Option<usize> {
        self.cap
    }

    pub fn includes(&self) -> &[IncludePath] {
        &self.includes
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        self.fetch
    }

    pub fn consistency_mode(&self) -> ConsistencyMode {
        self.consistency
    }

    /// Cheap structural summary for logging and test assertions
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            filter_count: self.filters.len(),
            order_count: self.orders.len(),
            include_count: self.includes.len(),
            grouped: self.group.is_some(),
            row_cap: self.cap,
            fetch: self.fetch,
            consistency: self.consistency,
        }
    }

    /// Execute the plan against an in-memory row set.
    ///
    /// Clause semantics: filters first, then a stable multi-key sort, then
    /// group-dedup keeping each group's first row in sort order, then the
    /// row cap. Include paths are metadata for relational adapters and do
    /// not alter an in-memory row set.
    pub fn evaluate(&self, mut rows: Vec<E>) -> Vec<E> {
        rows.retain(|row| self.filters.iter().all(|clause| clause.matches(row)));

        if !self.orders.is_empty() {
            rows.sort_by(|a, b| {
                for clause in &self.orders {
                    let ordering = clause.compare(a, b);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(group) = &self.group {
            let mut kept: Vec<E> = Vec::new();
            let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
            for row in rows {
                let hash = group.hash_of(&row);
                let candidates = buckets.entry(hash).or_default();
                let duplicate = candidates
                    .iter()
                    .any(|&index| group.same_group(&kept[index], &row));
                if !duplicate {
                    candidates.push(kept.len());
                    kept.push(row);
                }
            }
            rows = kept;
        }

        if let Some(cap) = self.cap {
            rows.truncate(cap);
        }

        rows
    }
}

impl<E> Default for QueryPlan<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for QueryPlan<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            orders: self.orders.clone(),
            includes: self.includes.clone(),
            group: self.group.clone(),
            cap: self.cap,
            fetch: self.fetch,
            consistency: self.consistency,
        }
    }
}

impl<E> fmt::Debug for QueryPlan<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlan")
            .field("summary", &self.summary())
            .finish()
    }
}

impl<E> Queryable<E> for QueryPlan<E> {
    fn filter(mut self, clause: FilterClause<E>) -> Self {
        self.filters.push(clause);
        self
    }

    fn order_by(mut self, clause: OrderClause<E>) -> Self {
        // Fresh sort origin: any previous ordering is discarded.
        self.orders.clear();
        self.orders.push(clause);
        self
    }

    fn then_by(mut self, clause: OrderClause<E>) -> Self {
        self.orders.push(clause);
        self
    }

    fn include(mut self, path: IncludePath) -> Self {
        self.includes.push(path);
        self
    }

    fn dedup_by(mut self, key: GroupKey<E>) -> Self {
        self.group = Some(key);
        self
    }

    fn take(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    fn fetch(mut self, strategy: FetchStrategy) -> Self {
        self.fetch = strategy;
        self
    }

    fn consistency(mut self, mode: ConsistencyMode) -> Self {
        self.consistency = mode;
        self
    }
}

/// Structural snapshot of a plan, for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub filter_count: usize,
    pub order_count: usize,
    pub include_count: usize,
    pub grouped: bool,
    pub row_cap: Option<usize>,
    pub fetch: FetchStrategy,
    pub consistency: ConsistencyMode,
}
