//! Entity contract for store-addressable rows

use std::fmt;
use std::hash::Hash;

/// A row type the repository can query, insert, update and delete.
///
/// The key is the store's primary identifier. It must order deterministically
/// because the query composer falls back to an ascending key sort when a
/// specification carries no explicit order clause.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Primary key type
    type Key: Ord + Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static;

    /// Primary key of this row
    fn key(&self) -> Self::Key;
}
