//! # Spekt Core
//!
//! Typed query composition and a generic repository layer. Callers describe
//! what data they want as declarative specification objects; one engine
//! translates the description into an executable query plan, runs it
//! against a store session, and optionally projects results into DTOs or
//! stitches several independent specification results into one composite
//! read-model.
//!
//! Layers:
//! - `domain`: clause value objects, specifications, entity contract, ports
//! - `query`: the composer and the canonical query plan
//! - `repository`: the generic repository with scoped/transient sessions
//! - `application`: composed-DTO assembly, batch verification, task groups
//! - `infrastructure`: the in-memory store adapter

#![warn(rust_2018_idioms)]

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod query;
pub mod repository;

// Domain layer exports
pub use domain::{
    ConsistencyMode, Entity, FetchStrategy, FilterClause, Filterable, GroupKey, IncludePath,
    OrderClause, ProcedureParams, ProjectingSpecification, ProjectionDescriptor, Projector,
    Queryable, SessionFactory, SortDirection, Specification, SpecificationBuilder, StoreSession,
    Verification, VerificationBuilder,
};

// Query engine exports
pub use query::{apply_specification, apply_verification, PlanSummary, QueryPlan};

// Repository exports
pub use repository::{Lifetime, Repository};

// Application layer exports
pub use application::{assemble_composed, verify_all, ComposedField, Expectation, TaskGroup};

// Configuration and error exports
pub use config::{ComposeOptions, RepositoryConfig};
pub use error::{RepositoryError, RepositoryResult, StoreError};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        assemble_composed, verify_all, ComposedField, ConsistencyMode, Entity, Expectation,
        FetchStrategy, Filterable, Lifetime, ProjectingSpecification, ProjectionDescriptor,
        Projector, Repository, RepositoryError, RepositoryResult, SessionFactory, SortDirection,
        Specification, StoreError, StoreSession, TaskGroup, Verification,
    };
    pub use tokio_util::sync::CancellationToken;
}
