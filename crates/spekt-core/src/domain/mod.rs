//! Domain layer - specification model and store ports
//!
//! Contains the entity contract, clause value objects, the specification
//! and verification types, and the ports a store adapter must implement.
//! No dependencies on infrastructure concerns.

pub mod entity;
pub mod ports;
pub mod specifications;
pub mod value_objects;

pub use entity::Entity;
pub use ports::{ProcedureParams, Projector, Queryable, SessionFactory, StoreSession};
pub use specifications::{
    Filterable, ProjectingSpecification, Specification, SpecificationBuilder, Verification,
    VerificationBuilder,
};
pub use value_objects::{
    ConsistencyMode, FetchStrategy, FilterClause, GroupKey, IncludePath, OrderClause,
    ProjectionDescriptor, SortDirection,
};
