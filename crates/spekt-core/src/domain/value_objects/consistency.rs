//! Tracking and fetch-strategy toggles

use serde::{Deserialize, Serialize};

/// Governs whether entities returned by a query stay mutable and
/// change-detectable inside the store session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsistencyMode {
    /// Entities are tracked by the session and participate in save-time
    /// change detection
    #[default]
    TrackAll,
    /// Entities are detached snapshots
    NoTracking,
    /// Detached snapshots, but rows sharing a key within one result set
    /// resolve to the same instance
    NoTrackingWithIdentityResolution,
}

/// Governs how eager-loaded collections are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchStrategy {
    /// One round-trip; joins can blow up cartesian-style on wide includes
    #[default]
    SingleQuery,
    /// One round-trip per include path
    SplitQuery,
}
