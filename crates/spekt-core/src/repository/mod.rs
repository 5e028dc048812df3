//! Generic repository bound to one entity type
//!
//! The stateful façade over the query composer and a store session. Two
//! session lifetimes are supported: scoped (one session shared across all
//! calls, driven serially) and transient (one session per call, safe for
//! concurrent callers).

use crate::config::RepositoryConfig;
use crate::domain::entity::Entity;
use crate::domain::ports::{ProcedureParams, Projector, SessionFactory, StoreSession};
use crate::domain::specifications::{
    Filterable, ProjectingSpecification, Specification, Verification,
};
use crate::domain::value_objects::ProjectionDescriptor;
use crate::error::{guard_cancelled, RepositoryError, RepositoryResult, StoreError};
use crate::query::{apply_specification, apply_verification, QueryPlan};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Session lifetime strategy of a repository instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One session shared across all calls; operations are serialized
    /// because the underlying session is not concurrency-safe
    Scoped,
    /// A fresh session per call, dropped on completion; concurrent calls
    /// on the same repository are safe
    Transient,
}

/// Either a lock on the shared scoped session or an owned per-call session.
enum SessionHandle<'a, S> {
    Scoped(MutexGuard<'a, S>),
    Transient(S),
}

impl<S> Deref for SessionHandle<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match self {
            SessionHandle::Scoped(guard) => guard,
            SessionHandle::Transient(session) => session,
        }
    }
}

/// Generic repository for one entity type.
///
/// Every read routes through the query composer; every operation takes a
/// cancellation token honored end-to-end and returns either a value or a
/// typed failure, never both.
pub struct Repository<E: Entity, F: SessionFactory<E>> {
    factory: Arc<F>,
    scoped: Option<Mutex<F::Session>>,
    config: RepositoryConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, F> Repository<E, F>
where
    E: Entity,
    F: SessionFactory<E>,
{
    /// Open a scoped repository: one session now, reused by every call.
    pub async fn scoped(factory: Arc<F>) -> RepositoryResult<Self> {
        Self::scoped_with_config(factory, RepositoryConfig::default()).await
    }

    pub async fn scoped_with_config(
        factory: Arc<F>,
        config: RepositoryConfig,
    ) -> RepositoryResult<Self> {
        let session = factory.open().await?;
        Ok(Self {
            factory,
            scoped: Some(Mutex::new(session)),
            config,
            _entity: PhantomData,
        })
    }

    /// Create a transient repository: a fresh session per call.
    pub fn transient(factory: Arc<F>) -> Self {
        Self::transient_with_config(factory, RepositoryConfig::default())
    }

    pub fn transient_with_config(factory: Arc<F>, config: RepositoryConfig) -> Self {
        Self {
            factory,
            scoped: None,
            config,
            _entity: PhantomData,
        }
    }

    pub fn lifetime(&self) -> Lifetime {
        if self.scoped.is_some() {
            Lifetime::Scoped
        } else {
            Lifetime::Transient
        }
    }

    async fn session(&self) -> RepositoryResult<SessionHandle<'_, F::Session>> {
        match &self.scoped {
            Some(shared) => Ok(SessionHandle::Scoped(shared.lock().await)),
            None => Ok(SessionHandle::Transient(self.factory.open().await?)),
        }
    }

    fn spec_name(specification: Option<&Specification<E>>) -> &str {
        specification.map_or("unfiltered", |s| s.name())
    }

    /// True if any row matches. An absent verification matches everything
    /// and short-circuits without a store round-trip.
    pub async fn exists(
        &self,
        verification: Option<&Verification<E>>,
        token: &CancellationToken,
    ) -> RepositoryResult<bool> {
        let Some(verification) = verification else {
            return Ok(true);
        };
        guard_cancelled(token, "exists")?;
        debug!(verification = verification.name(), "existence check");

        let plan =
            apply_verification(QueryPlan::new(), Some(verification), &self.config.compose)
                .cap_at_most(1);
        let session = self.session().await?;
        let rows = session.query(plan, token).await?;
        Ok(!rows.is_empty())
    }

    /// True iff exactly one row matches. Caps the probe at two rows, so the
    /// cost is bounded regardless of how many rows actually match.
    pub async fn exists_unique(
        &self,
        verification: Option<&Verification<E>>,
        token: &CancellationToken,
    ) -> RepositoryResult<bool> {
        guard_cancelled(token, "exists_unique")?;
        debug!(
            verification = verification.map_or("unfiltered", |v| v.name()),
            "uniqueness check"
        );

        let plan = apply_verification(QueryPlan::new(), verification, &self.config.compose)
            .cap_at_most(2);
        let session = self.session().await?;
        let rows = session.query(plan, token).await?;
        Ok(rows.len() == 1)
    }

    /// Fetch the entities matching a specification.
    pub async fn get(
        &self,
        specification: Option<&Specification<E>>,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>> {
        guard_cancelled(token, "get")?;
        debug!(specification = Self::spec_name(specification), "collection fetch");

        let plan = apply_specification(QueryPlan::new(), specification, &self.config.compose);
        let session = self.session().await?;
        session.query(plan, token).await
    }

    /// Fetch matching entities projected into DTOs. An absent specification
    /// projects the whole set with no member-expansion hints.
    pub async fn get_projected<D, P>(
        &self,
        specification: Option<&ProjectingSpecification<E, D>>,
        projector: &P,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<D>>
    where
        D: Send,
        P: Projector<E, D> + ?Sized,
    {
        guard_cancelled(token, "get_projected")?;
        let plan = apply_specification(
            QueryPlan::new(),
            specification.map(|s| s.specification()),
            &self.config.compose,
        );
        let session = self.session().await?;
        let rows = session.query(plan, token).await?;

        let empty = ProjectionDescriptor::default();
        let descriptor = specification.map_or(&empty, |s| s.projection());
        projector.project(rows, descriptor).await
    }

    /// Fetch exactly one entity. Zero matches fail with `EmptyResult`; more
    /// than one match propagates the store's multiplicity failure.
    pub async fn get_single(
        &self,
        specification: Option<&Specification<E>>,
        token: &CancellationToken,
    ) -> RepositoryResult<E> {
        guard_cancelled(token, "get_single")?;
        let name = Self::spec_name(specification).to_string();
        debug!(specification = %name, "single fetch");

        let plan = apply_specification(QueryPlan::new(), specification, &self.config.compose)
            .cap_at_most(2);
        let session = self.session().await?;
        let mut rows = session.query(plan, token).await?;

        if rows.len() > 1 {
            return Err(StoreError::non_unique(format!(
                "specification '{name}' matched more than one row"
            ))
            .into());
        }
        rows.pop().ok_or_else(|| {
            RepositoryError::empty_result(format!("specification '{name}' matched no rows"))
        })
    }

    /// Fetch the first matching entity per the specification's ordering
    /// (or the deterministic key fallback). Fails only on zero matches.
    pub async fn get_first(
        &self,
        specification: Option<&Specification<E>>,
        token: &CancellationToken,
    ) -> RepositoryResult<E> {
        guard_cancelled(token, "get_first")?;
        let name = Self::spec_name(specification).to_string();
        debug!(specification = %name, "first fetch");

        let plan = apply_specification(QueryPlan::new(), specification, &self.config.compose)
            .cap_at_most(1);
        let session = self.session().await?;
        let mut rows = session.query(plan, token).await?;
        rows.pop().ok_or_else(|| {
            RepositoryError::empty_result(format!("specification '{name}' matched no rows"))
        })
    }

    /// Insert one entity, returning the stored row.
    pub async fn insert(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E> {
        guard_cancelled(token, "insert")?;
        let session = self.session().await?;
        session.insert(entity, token).await
    }

    /// Insert many entities as one atomic batch.
    pub async fn insert_bulk(
        &self,
        entities: Vec<E>,
        token: &CancellationToken,
    ) -> RepositoryResult<()> {
        guard_cancelled(token, "insert_bulk")?;
        debug!(count = entities.len(), "bulk insert");
        let session = self.session().await?;
        session.insert_bulk(entities, token).await
    }

    /// Update one entity. Writes exactly the entity it was given; a missing
    /// target fails with `NotFound`.
    pub async fn update(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E> {
        guard_cancelled(token, "update")?;
        let session = self.session().await?;
        session.update(entity, token).await
    }

    /// Delete an entity, returning the removed row.
    pub async fn delete(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E> {
        self.delete_by_key(entity.key(), token).await
    }

    /// Look up by key and delete; a missing target fails with `NotFound`.
    pub async fn delete_by_key(
        &self,
        key: E::Key,
        token: &CancellationToken,
    ) -> RepositoryResult<E> {
        guard_cancelled(token, "delete")?;
        debug!(key = ?key, "delete");
        let session = self.session().await?;
        session.delete(key, token).await
    }

    /// Run a named stored routine for its side effects.
    pub async fn execute_procedure(
        &self,
        name: &str,
        params: ProcedureParams,
        token: &CancellationToken,
    ) -> RepositoryResult<()> {
        guard_cancelled(token, "execute_procedure")?;
        debug!(procedure = name, "procedure call");
        let session = self.session().await?;
        session.execute_procedure(name, &params, token).await?;
        Ok(())
    }

    /// Run a named stored routine and pass its result set through the query
    /// composer: filters, ordering, grouping and the row cap still apply on
    /// top of whatever the routine returned.
    pub async fn fetch_procedure(
        &self,
        name: &str,
        specification: Option<&Specification<E>>,
        params: ProcedureParams,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>> {
        guard_cancelled(token, "fetch_procedure")?;
        debug!(
            procedure = name,
            specification = Self::spec_name(specification),
            "procedure fetch"
        );
        let session = self.session().await?;
        let rows = session.execute_procedure(name, &params, token).await?;

        let plan = apply_specification(QueryPlan::new(), specification, &self.config.compose);
        Ok(plan.evaluate(rows))
    }

    /// Procedure fetch projected into DTOs.
    pub async fn fetch_procedure_projected<D, P>(
        &self,
        name: &str,
        specification: Option<&ProjectingSpecification<E, D>>,
        params: ProcedureParams,
        projector: &P,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<D>>
    where
        D: Send,
        P: Projector<E, D> + ?Sized,
    {
        let rows = self
            .fetch_procedure(
                name,
                specification.map(|s| s.specification()),
                params,
                token,
            )
            .await?;

        let empty = ProjectionDescriptor::default();
        let descriptor = specification.map_or(&empty, |s| s.projection());
        projector.project(rows, descriptor).await
    }
}
