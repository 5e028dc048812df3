//! Clause value objects
//!
//! Pure data describing one filter, one ordering key, one eager-load path,
//! one grouping key, a row cap, a consistency mode and a fetch strategy.
//! Immutable once constructed; behavior is limited to evaluation helpers.

pub mod consistency;
pub mod filter_clause;
pub mod group_key;
pub mod include_path;
pub mod order_clause;
pub mod projection;

pub use consistency::{ConsistencyMode, FetchStrategy};
pub use filter_clause::FilterClause;
pub use group_key::GroupKey;
pub use include_path::IncludePath;
pub use order_clause::{OrderClause, SortDirection};
pub use projection::ProjectionDescriptor;
