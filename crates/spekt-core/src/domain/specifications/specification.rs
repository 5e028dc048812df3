//! Full query specifications

use crate::domain::specifications::Filterable;
use crate::domain::value_objects::{
    ConsistencyMode, FetchStrategy, FilterClause, GroupKey, IncludePath, OrderClause,
};
use std::fmt;
use std::hash::Hash;

/// Declarative description of how to filter, order and shape a query
/// against one entity type.
///
/// Constructed once per logical query through [`Specification::builder`],
/// frozen afterwards, handed to the repository by reference and never
/// persisted. At most one group key and one row cap.
pub struct Specification<E> {
    name: String,
    filters: Vec<FilterClause<E>>,
    orders: Vec<OrderClause<E>>,
    includes: Vec<IncludePath>,
    group: Option<GroupKey<E>>,
    row_cap: Option<usize>,
    consistency: ConsistencyMode,
    fetch: FetchStrategy,
}

impl<E> Specification<E> {
    /// Start building a specification
    pub fn builder(name: impl Into<String>) -> SpecificationBuilder<E> {
        SpecificationBuilder {
            name: name.into(),
            filters: Vec::new(),
            orders: Vec::new(),
            includes: Vec::new(),
            group: None,
            row_cap: None,
            consistency: ConsistencyMode::default(),
            fetch: FetchStrategy::default(),
        }
    }

    /// Order clauses in insertion order; the first establishes the primary
    /// sort, the rest are then-by sorts
    pub fn orders(&self) -> &[OrderClause<E>] {
        &self.orders
    }

    pub fn includes(&self) -> &[IncludePath] {
        &self.includes
    }

    pub fn group_key(&self) -> Option<&GroupKey<E>> {
        self.group.as_ref()
    }

    /// Row cap, applied after filtering, ordering and grouping
    pub fn row_cap(&self) -> Option<usize> {
        self.row_cap
    }

    pub fn consistency_mode(&self) -> ConsistencyMode {
        self.consistency
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        self.fetch
    }
}

impl<E> Filterable<E> for Specification<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[FilterClause<E>] {
        &self.filters
    }
}

impl<E> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            filters: self.filters.clone(),
            orders: self.orders.clone(),
            includes: self.includes.clone(),
            group: self.group.clone(),
            row_cap: self.row_cap,
            consistency: self.consistency,
            fetch: self.fetch,
        }
    }
}

impl<E> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("name", &self.name)
            .field("filters", &self.filters.len())
            .field("orders", &self.orders.len())
            .field("includes", &self.includes)
            .field("grouped", &self.group.is_some())
            .field("row_cap", &self.row_cap)
            .field("consistency", &self.consistency)
            .field("fetch", &self.fetch)
            .finish()
    }
}

/// Builder for [`Specification`]; the result is immutable.
pub struct SpecificationBuilder<E> {
    name: String,
    filters: Vec<FilterClause<E>>,
    orders: Vec<OrderClause<E>>,
    includes: Vec<IncludePath>,
    group: Option<GroupKey<E>>,
    row_cap: Option<usize>,
    consistency: ConsistencyMode,
    fetch: FetchStrategy,
}

impl<E> SpecificationBuilder<E> {
    /// Add a filter clause; clauses are AND-combined in insertion order
    pub fn filter(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(FilterClause::new(predicate));
        self
    }

    /// Add an ascending order clause
    pub fn order_by_asc<K: Ord>(mut self, key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        self.orders.push(OrderClause::asc(key));
        self
    }

    /// Add a descending order clause
    pub fn order_by_desc<K: Ord>(mut self, key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        self.orders.push(OrderClause::desc(key));
        self
    }

    /// Add an eager-load path
    pub fn include(mut self, path: impl Into<IncludePath>) -> Self {
        self.includes.push(path.into());
        self
    }

    /// Group by the extracted key and flatten back, keeping the first row
    /// of every group. At most one key; a second call replaces the first.
    pub fn group_by<K>(mut self, key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self
    where
        K: Hash + Eq + 'static,
    {
        self.group = Some(GroupKey::by(key));
        self
    }

    /// Cap the number of returned rows, applied after all other clauses.
    /// At most one cap; a second call replaces the first.
    pub fn row_cap(mut self, cap: usize) -> Self {
        self.row_cap = Some(cap);
        self
    }

    pub fn consistency(mut self, mode: ConsistencyMode) -> Self {
        self.consistency = mode;
        self
    }

    pub fn fetch(mut self, strategy: FetchStrategy) -> Self {
        self.fetch = strategy;
        self
    }

    pub fn build(self) -> Specification<E> {
        Specification {
            name: self.name,
            filters: self.filters,
            orders: self.orders,
            includes: self.includes,
            group: self.group,
            row_cap: self.row_cap,
            consistency: self.consistency,
            fetch: self.fetch,
        }
    }
}
