//! Infrastructure adapters
//!
//! Implementations of the domain's store ports. The in-memory adapter backs
//! tests and development; real deployments implement the same ports against
//! an actual database.

pub mod memory;

pub use memory::{FnProjector, InMemorySession, InMemoryStore, QueryRecord};
