//! Clause application in fixed order
//!
//! Pure, stateless transformations from a verification or specification to
//! clause applications on a queryable source. Safe to call repeatedly; this
//! layer never touches the store, so it cannot fail.

use crate::config::ComposeOptions;
use crate::domain::entity::Entity;
use crate::domain::ports::Queryable;
use crate::domain::specifications::{Filterable, Specification, Verification};
use crate::domain::value_objects::OrderClause;
use tracing::trace;

/// Apply a verification's filter clauses to a source.
///
/// An absent verification short-circuits to the identity. With the
/// deterministic fallback enabled, an ascending key sort is issued so that
/// capped existence probes see a stable prefix.
pub fn apply_verification<E, Q>(
    source: Q,
    verification: Option<&Verification<E>>,
    options: &ComposeOptions,
) -> Q
where
    E: Entity,
    Q: Queryable<E>,
{
    let Some(verification) = verification else {
        return source;
    };
    trace!(name = verification.name(), "composing verification");

    let mut query = source;
    for clause in verification.filters() {
        query = query.filter(clause.clone());
    }
    if options.deterministic_fallback {
        query = query.order_by(OrderClause::asc(|entity: &E| entity.key()));
    }
    query
}

/// Apply a specification's clauses to a source, in the documented order:
/// filters, includes, orders, group-flatten, row cap, fetch strategy, and
/// tracking policy last so it sees the final query shape.
///
/// The first order clause issues the fresh primary sort; every subsequent
/// clause chains a secondary sort. One call applies at most one fresh sort
/// origin. An absent specification short-circuits to the identity.
pub fn apply_specification<E, Q>(
    source: Q,
    specification: Option<&Specification<E>>,
    options: &ComposeOptions,
) -> Q
where
    E: Entity,
    Q: Queryable<E>,
{
    let Some(spec) = specification else {
        return source;
    };
    trace!(name = spec.name(), "composing specification");

    let mut query = source;

    for clause in spec.filters() {
        query = query.filter(clause.clone());
    }

    for path in spec.includes() {
        query = query.include(path.clone());
    }

    let mut ordered = false;
    for clause in spec.orders() {
        query = if ordered {
            query.then_by(clause.clone())
        } else {
            ordered = true;
            query.order_by(clause.clone())
        };
    }
    if !ordered && options.deterministic_fallback {
        query = query.order_by(OrderClause::asc(|entity: &E| entity.key()));
    }

    if let Some(group) = spec.group_key() {
        query = query.dedup_by(group.clone());
    }

    if let Some(cap) = spec.row_cap() {
        query = query.take(cap);
    }

    query = query.fetch(spec.fetch_strategy());
    query.consistency(spec.consistency_mode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        ConsistencyMode, FetchStrategy, FilterClause, GroupKey, IncludePath,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
    }

    impl Entity for Row {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    /// Records clause applications instead of building a query.
    #[derive(Default)]
    struct Recording {
        ops: Vec<String>,
    }

    impl Queryable<Row> for Recording {
        fn filter(mut self, _clause: FilterClause<Row>) -> Self {
            self.ops.push("filter".into());
            self
        }
        fn order_by(mut self, clause: OrderClause<Row>) -> Self {
            self.ops.push(format!("order_by({:?})", clause.direction()));
            self
        }
        fn then_by(mut self, clause: OrderClause<Row>) -> Self {
            self.ops.push(format!("then_by({:?})", clause.direction()));
            self
        }
        fn include(mut self, path: IncludePath) -> Self {
            self.ops.push(format!("include({path})"));
            self
        }
        fn dedup_by(mut self, _key: GroupKey<Row>) -> Self {
            self.ops.push("dedup_by".into());
            self
        }
        fn take(mut self, cap: usize) -> Self {
            self.ops.push(format!("take({cap})"));
            self
        }
        fn fetch(mut self, strategy: FetchStrategy) -> Self {
            self.ops.push(format!("fetch({strategy:?})"));
            self
        }
        fn consistency(mut self, mode: ConsistencyMode) -> Self {
            self.ops.push(format!("consistency({mode:?})"));
            self
        }
    }

    #[test]
    fn clauses_apply_in_the_documented_order() {
        let spec = Specification::<Row>::builder("full")
            .filter(|r| r.id > 0)
            .filter(|r| r.id < 100)
            .include("orders")
            .order_by_asc(|r| r.id)
            .order_by_desc(|r| r.id % 10)
            .group_by(|r| r.id % 2)
            .row_cap(5)
            .fetch(FetchStrategy::SplitQuery)
            .consistency(ConsistencyMode::NoTracking)
            .build();

        let recorded = apply_specification(
            Recording::default(),
            Some(&spec),
            &ComposeOptions::default(),
        );

        assert_eq!(
            recorded.ops,
            vec![
                "filter",
                "filter",
                "include(orders)",
                "order_by(Ascending)",
                "then_by(Descending)",
                "dedup_by",
                "take(5)",
                "fetch(SplitQuery)",
                "consistency(NoTracking)",
            ]
        );
    }

    #[test]
    fn at_most_one_fresh_sort_origin_per_call() {
        let spec = Specification::<Row>::builder("ordered")
            .order_by_asc(|r| r.id)
            .order_by_asc(|r| r.id % 7)
            .order_by_desc(|r| r.id % 3)
            .build();

        let recorded = apply_specification(
            Recording::default(),
            Some(&spec),
            &ComposeOptions::without_fallback(),
        );

        let fresh = recorded.ops.iter().filter(|op| op.starts_with("order_by")).count();
        let chained = recorded.ops.iter().filter(|op| op.starts_with("then_by")).count();
        assert_eq!(fresh, 1);
        assert_eq!(chained, 2);
    }

    #[test]
    fn absent_specification_is_the_identity() {
        let recorded = apply_specification(Recording::default(), None, &ComposeOptions::default());
        assert!(recorded.ops.is_empty());

        let recorded = apply_verification(Recording::default(), None, &ComposeOptions::default());
        assert!(recorded.ops.is_empty());
    }

    #[test]
    fn empty_specification_only_stamps_the_final_toggles() {
        let spec = Specification::<Row>::builder("empty").build();
        let recorded = apply_specification(
            Recording::default(),
            Some(&spec),
            &ComposeOptions::without_fallback(),
        );
        assert_eq!(
            recorded.ops,
            vec!["fetch(SingleQuery)", "consistency(TrackAll)"]
        );
    }

    #[test]
    fn fallback_ordering_kicks_in_when_no_order_clause_is_given() {
        let spec = Specification::<Row>::builder("unordered").build();
        let recorded = apply_specification(
            Recording::default(),
            Some(&spec),
            &ComposeOptions::default(),
        );
        assert_eq!(recorded.ops[0], "order_by(Ascending)");

        let verification = Verification::<Row>::builder("exists").filter(|r| r.id == 1).build();
        let recorded = apply_verification(
            Recording::default(),
            Some(&verification),
            &ComposeOptions::default(),
        );
        assert_eq!(recorded.ops, vec!["filter", "order_by(Ascending)"]);
    }

    #[test]
    fn explicit_ordering_suppresses_the_fallback() {
        let spec = Specification::<Row>::builder("ordered")
            .order_by_desc(|r| r.id)
            .build();
        let recorded = apply_specification(
            Recording::default(),
            Some(&spec),
            &ComposeOptions::default(),
        );
        let sorts: Vec<&String> = recorded
            .ops
            .iter()
            .filter(|op| op.starts_with("order_by"))
            .collect();
        assert_eq!(sorts, vec!["order_by(Descending)"]);
    }
}
