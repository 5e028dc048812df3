//! Task orchestration with dependent and independent completion policies
//!
//! Both policies drive a "wait for the first completion among the remaining
//! set, remove it, inspect it, repeat" loop rather than a pre-built batch
//! await, so the dependent policy reacts to the first failure instead of
//! the last.

use crate::error::RepositoryResult;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A dynamic set of in-flight asynchronous operations sharing one
/// cancellation token.
///
/// Operations that should react to a dependent failure must observe the
/// group's token (or a child of it); the group trips it when the first
/// operation fails under the dependent policy.
pub struct TaskGroup<T> {
    tasks: FuturesUnordered<BoxFuture<'static, RepositoryResult<T>>>,
    token: CancellationToken,
}

impl<T> TaskGroup<T>
where
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Adopt an external token, e.g. a request-scoped one, so outside
    /// cancellation reaches every operation in the group.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            tasks: FuturesUnordered::new(),
            token,
        }
    }

    /// The group's shared cancellation token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Add an operation to the set
    pub fn spawn<Fut>(&mut self, operation: Fut)
    where
        Fut: Future<Output = RepositoryResult<T>> + Send + 'static,
    {
        self.tasks.push(Box::pin(operation));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Dependent policy: the operations are logically related. The first
    /// failure cancels the shared token, the remaining operations are
    /// drained so they observe the cancellation and release their resources,
    /// partial results are discarded, and that first failure is returned.
    pub async fn join_dependent(mut self) -> RepositoryResult<Vec<T>> {
        let mut results = Vec::new();
        while let Some(outcome) = self.tasks.next().await {
            match outcome {
                Ok(value) => results.push(value),
                Err(error) => {
                    warn!(%error, remaining = self.tasks.len(), "dependent task failed, cancelling siblings");
                    self.token.cancel();
                    while self.tasks.next().await.is_some() {}
                    return Err(error);
                }
            }
        }
        debug!(completed = results.len(), "dependent task set completed");
        Ok(results)
    }

    /// Independent policy: the operations are unrelated. Every one runs to
    /// completion regardless of the others; all outcomes are collected in
    /// completion order. Never cancels.
    pub async fn join_independent(mut self) -> Vec<RepositoryResult<T>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.tasks.next().await {
            outcomes.push(outcome);
        }
        debug!(completed = outcomes.len(), "independent task set completed");
        outcomes
    }
}

impl<T> Default for TaskGroup<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
