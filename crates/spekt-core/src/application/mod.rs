//! Application layer - composition over repositories
//!
//! Assembles aggregate read-models from several independent specification
//! results, runs batched existence verifications, and orchestrates sets of
//! asynchronous operations with dependent or independent completion policy.

pub mod composed;
pub mod orchestrator;
pub mod verify;

pub use composed::{assemble_composed, ComposedField};
pub use orchestrator::TaskGroup;
pub use verify::{verify_all, Expectation};
