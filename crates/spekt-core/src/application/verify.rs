//! Batched existence verification
//!
//! Runs a list of verification expectations serially and aggregates every
//! mismatch, so the caller sees the complete picture rather than only the
//! first failing check.

use crate::domain::entity::Entity;
use crate::domain::ports::SessionFactory;
use crate::domain::specifications::Verification;
use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::Repository;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type ExpectationCheck =
    Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, RepositoryResult<bool>> + Send>;

/// One expectation: a verification, whether the match must be unique, the
/// expected boolean outcome, and the failure message reported on mismatch.
pub struct Expectation {
    message: String,
    expected: bool,
    check: ExpectationCheck,
}

impl Expectation {
    /// Build an expectation bound to a repository at the call site, where
    /// the entity type is still known.
    pub fn new<E, F>(
        repository: Arc<Repository<E, F>>,
        verification: Verification<E>,
        must_be_unique: bool,
        expected: bool,
        message: impl Into<String>,
    ) -> Self
    where
        E: Entity,
        F: SessionFactory<E> + 'static,
    {
        Self {
            message: message.into(),
            expected,
            check: Box::new(move |token| {
                Box::pin(async move {
                    if must_be_unique {
                        repository.exists_unique(Some(&verification), &token).await
                    } else {
                        repository.exists(Some(&verification), &token).await
                    }
                })
            }),
        }
    }

    /// Expect `exists` to return `expected`
    pub fn exists<E, F>(
        repository: Arc<Repository<E, F>>,
        verification: Verification<E>,
        expected: bool,
        message: impl Into<String>,
    ) -> Self
    where
        E: Entity,
        F: SessionFactory<E> + 'static,
    {
        Self::new(repository, verification, false, expected, message)
    }

    /// Expect `exists_unique` to return `expected`
    pub fn exists_unique<E, F>(
        repository: Arc<Repository<E, F>>,
        verification: Verification<E>,
        expected: bool,
        message: impl Into<String>,
    ) -> Self
    where
        E: Entity,
        F: SessionFactory<E> + 'static,
    {
        Self::new(repository, verification, true, expected, message)
    }
}

/// Run every expectation serially, in list order, and compare actual against
/// expected outcomes. Mismatches accumulate; the batch fails with a
/// `ValidationAggregate` carrying all of them only after every expectation
/// has run. Store failures and cancellation are not mismatches and propagate
/// immediately.
pub async fn verify_all(
    expectations: Vec<Expectation>,
    token: &CancellationToken,
) -> RepositoryResult<()> {
    let total = expectations.len();
    let mut mismatches = Vec::new();

    for expectation in expectations {
        let actual = (expectation.check)(token.clone()).await?;
        if actual != expectation.expected {
            mismatches.push(expectation.message);
        }
    }

    debug!(total, mismatched = mismatches.len(), "batch verification done");
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::ValidationAggregate(mismatches))
    }
}
