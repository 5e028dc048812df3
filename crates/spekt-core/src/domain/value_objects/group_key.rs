//! Grouping key value object

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A grouping key used to deduplicate a result set.
///
/// Grouped rows are flattened straight back to an entity-shaped sequence:
/// group-then-ungroup keeps the first row of every group and performs no
/// aggregation. At most one key per specification.
pub struct GroupKey<E> {
    hash: Arc<dyn Fn(&E) -> u64 + Send + Sync>,
    eq: Arc<dyn Fn(&E, &E) -> bool + Send + Sync>,
}

impl<E> GroupKey<E> {
    /// Group by the extracted key
    pub fn by<K>(key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self
    where
        K: Hash + Eq + 'static,
    {
        let key = Arc::new(key);
        let key_for_eq = Arc::clone(&key);
        Self {
            hash: Arc::new(move |entity| {
                let mut hasher = DefaultHasher::new();
                key(entity).hash(&mut hasher);
                hasher.finish()
            }),
            eq: Arc::new(move |a, b| key_for_eq(a) == key_for_eq(b)),
        }
    }

    /// Hash of the extracted key, for bucketing
    pub fn hash_of(&self, entity: &E) -> u64 {
        (self.hash)(entity)
    }

    /// Whether two entities fall into the same group
    pub fn same_group(&self, a: &E, b: &E) -> bool {
        (self.eq)(a, b)
    }
}

impl<E> Clone for GroupKey<E> {
    fn clone(&self) -> Self {
        Self {
            hash: Arc::clone(&self.hash),
            eq: Arc::clone(&self.eq),
        }
    }
}

impl<E> fmt::Debug for GroupKey<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupKey").finish_non_exhaustive()
    }
}
