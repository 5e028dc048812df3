//! Query plan and clause composition
//!
//! `compose` turns a verification or specification into clause applications
//! against any [`Queryable`](crate::domain::Queryable) source in a fixed,
//! documented order. `QueryPlan` is the canonical source handed to store
//! sessions, with a pure in-memory evaluator reused for procedure result
//! post-processing.

pub mod compose;
pub mod plan;

pub use compose::{apply_specification, apply_verification};
pub use plan::{PlanSummary, QueryPlan};
