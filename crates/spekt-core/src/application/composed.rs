//! Composed-DTO assembly
//!
//! Builds one aggregate read-model from several independent specification
//! results. Each field binding is constructed at the call site, where the
//! entity and DTO types are still known, and carries a typed setter closure
//! into the composite. There is no runtime field-name lookup and no type
//! recovery: a binding that does not fit the composite does not compile.

use crate::domain::entity::Entity;
use crate::domain::ports::SessionFactory;
use crate::domain::specifications::Specification;
use crate::error::RepositoryResult;
use crate::repository::Repository;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type FieldResolver<C> =
    Box<dyn FnOnce(C, CancellationToken) -> BoxFuture<'static, RepositoryResult<C>> + Send>;

/// One field of a composite read-model, bound to a specification and the
/// repository that resolves it.
pub struct ComposedField<C> {
    name: &'static str,
    resolve: FieldResolver<C>,
}

impl<C> ComposedField<C>
where
    C: Send + 'static,
{
    /// Bind a collection-typed field: resolved through the repository's
    /// collection fetch.
    pub fn collection<E, F, W>(
        name: &'static str,
        repository: Arc<Repository<E, F>>,
        specification: Specification<E>,
        write: W,
    ) -> Self
    where
        E: Entity,
        F: SessionFactory<E> + 'static,
        W: FnOnce(&mut C, Vec<E>) + Send + 'static,
    {
        Self {
            name,
            resolve: Box::new(move |mut composite, token| {
                Box::pin(async move {
                    let rows = repository.get(Some(&specification), &token).await?;
                    write(&mut composite, rows);
                    Ok(composite)
                })
            }),
        }
    }

    /// Bind a scalar field: resolved through the repository's single fetch,
    /// so zero matching rows abort the whole assembly with `EmptyResult`.
    pub fn scalar<E, F, W>(
        name: &'static str,
        repository: Arc<Repository<E, F>>,
        specification: Specification<E>,
        write: W,
    ) -> Self
    where
        E: Entity,
        F: SessionFactory<E> + 'static,
        W: FnOnce(&mut C, E) + Send + 'static,
    {
        Self {
            name,
            resolve: Box::new(move |mut composite, token| {
                Box::pin(async move {
                    let entity = repository.get_single(Some(&specification), &token).await?;
                    write(&mut composite, entity);
                    Ok(composite)
                })
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Assemble a composite read-model from its field bindings.
///
/// Fields resolve strictly in list order, one at a time: the bindings may
/// all target the same scoped repository, whose session must never see two
/// operations in flight. The first failing field aborts the assembly; no
/// partial composite is ever returned.
pub async fn assemble_composed<C>(
    fields: Vec<ComposedField<C>>,
    token: &CancellationToken,
) -> RepositoryResult<C>
where
    C: Default + Send + 'static,
{
    let mut composite = C::default();
    for field in fields {
        debug!(field = field.name, "resolving composed field");
        composite = (field.resolve)(composite, token.clone()).await?;
    }
    Ok(composite)
}
