//! Order clause value object

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Sort direction for one order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One ordering key with a direction.
///
/// The first clause of a specification establishes the primary sort;
/// every subsequent clause is a secondary (then-by) sort.
pub struct OrderClause<E> {
    key_cmp: Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>,
    direction: SortDirection,
}

impl<E> OrderClause<E> {
    /// Order ascending by the extracted key
    pub fn asc<K: Ord>(key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        Self {
            key_cmp: Arc::new(move |a, b| key(a).cmp(&key(b))),
            direction: SortDirection::Ascending,
        }
    }

    /// Order descending by the extracted key
    pub fn desc<K: Ord>(key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        Self {
            key_cmp: Arc::new(move |a, b| key(a).cmp(&key(b))),
            direction: SortDirection::Descending,
        }
    }

    /// Compare two entities under this clause, direction applied
    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        let ordering = (self.key_cmp)(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl<E> Clone for OrderClause<E> {
    fn clone(&self) -> Self {
        Self {
            key_cmp: Arc::clone(&self.key_cmp),
            direction: self.direction,
        }
    }
}

impl<E> fmt::Debug for OrderClause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderClause")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
