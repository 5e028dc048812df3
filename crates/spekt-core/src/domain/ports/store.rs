//! Store session, factory and projector ports

use crate::domain::entity::Entity;
use crate::domain::value_objects::ProjectionDescriptor;
use crate::error::RepositoryResult;
use crate::query::QueryPlan;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Named parameters for stored routine invocations
pub type ProcedureParams = HashMap<String, serde_json::Value>;

/// One live store connection/session.
///
/// A session is not safe for concurrent use; callers serialize access.
/// Every operation honors the cancellation token end-to-end and surfaces
/// cancellation as a `Cancelled` outcome distinct from domain failures.
#[async_trait]
pub trait StoreSession<E: Entity>: Send + Sync {
    /// Execute a composed query plan
    async fn query(
        &self,
        plan: QueryPlan<E>,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>>;

    /// Insert one entity; duplicate keys surface as a constraint violation
    async fn insert(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E>;

    /// Insert many entities as one atomic batch
    async fn insert_bulk(
        &self,
        entities: Vec<E>,
        token: &CancellationToken,
    ) -> RepositoryResult<()>;

    /// Update one existing entity; a missing target is `NotFound`
    async fn update(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E>;

    /// Delete by key, returning the removed entity; a missing target is `NotFound`
    async fn delete(&self, key: E::Key, token: &CancellationToken) -> RepositoryResult<E>;

    /// Run a named stored routine, returning its result rows (possibly empty)
    async fn execute_procedure(
        &self,
        name: &str,
        params: &ProcedureParams,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>>;
}

/// Opens store sessions.
///
/// A scoped repository opens one session up front and reuses it; a transient
/// repository opens a fresh session per call and drops it on completion, so
/// concurrent calls on the same repository stay safe.
#[async_trait]
pub trait SessionFactory<E: Entity>: Send + Sync {
    type Session: StoreSession<E> + 'static;

    async fn open(&self) -> RepositoryResult<Self::Session>;
}

/// Maps an entity result set into DTOs of type `D`, materializing only the
/// nested members the descriptor requests.
#[async_trait]
pub trait Projector<E, D>: Send + Sync {
    async fn project(
        &self,
        entities: Vec<E>,
        descriptor: &ProjectionDescriptor,
    ) -> RepositoryResult<Vec<D>>;
}
