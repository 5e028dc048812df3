//! Ports for store adapters
//!
//! The composer writes against the queryable port; the repository drives
//! the session and factory ports. Infrastructure adapters implement them
//! for concrete storage backends.

pub mod queryable;
pub mod store;

pub use queryable::Queryable;
pub use store::{ProcedureParams, Projector, SessionFactory, StoreSession};
