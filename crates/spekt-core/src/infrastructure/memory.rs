//! In-memory store implementation for testing and development

use crate::domain::entity::Entity;
use crate::domain::ports::{ProcedureParams, Projector, SessionFactory, StoreSession};
use crate::domain::value_objects::ProjectionDescriptor;
use crate::error::{guard_cancelled, RepositoryError, RepositoryResult, StoreError};
use crate::query::{PlanSummary, QueryPlan};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type ProcedureFn<E> = Arc<
    dyn Fn(&ProcedureParams, &mut BTreeMap<<E as Entity>::Key, E>) -> RepositoryResult<Vec<E>>
        + Send
        + Sync,
>;

/// One executed query, recorded for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub summary: PlanSummary,
    pub rows_returned: usize,
}

/// In-memory implementation of the store ports.
///
/// Rows live in a key-ordered map so unordered scans are still
/// deterministic. Every executed query is appended to a log that tests use
/// to assert plan shape, e.g. that uniqueness probes stay capped at two
/// rows.
pub struct InMemoryStore<E: Entity> {
    rows: Arc<RwLock<BTreeMap<E::Key, E>>>,
    procedures: Arc<RwLock<HashMap<String, ProcedureFn<E>>>>,
    query_log: Arc<RwLock<Vec<QueryRecord>>>,
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            procedures: Arc::new(RwLock::new(HashMap::new())),
            query_log: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Load rows directly, bypassing constraint checks (for test setup)
    pub fn seed(&self, entities: impl IntoIterator<Item = E>) {
        let mut rows = self.rows.write();
        for entity in entities {
            rows.insert(entity.key(), entity);
        }
    }

    /// Get number of stored rows
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Fetch one row by key, outside any session
    pub fn row(&self, key: &E::Key) -> Option<E> {
        self.rows.read().get(key).cloned()
    }

    /// Clear all rows and the query log (for testing)
    pub fn clear(&self) {
        self.rows.write().clear();
        self.query_log.write().clear();
    }

    /// Register a named stored routine. The routine receives the call
    /// parameters and mutable access to the row map, and returns its
    /// result rows.
    pub fn register_procedure(
        &self,
        name: impl Into<String>,
        procedure: impl Fn(&ProcedureParams, &mut BTreeMap<E::Key, E>) -> RepositoryResult<Vec<E>>
            + Send
            + Sync
            + 'static,
    ) {
        self.procedures
            .write()
            .insert(name.into(), Arc::new(procedure));
    }

    /// Snapshot of every executed query, oldest first
    pub fn query_log(&self) -> Vec<QueryRecord> {
        self.query_log.read().clone()
    }

    /// The most recently executed query
    pub fn last_query(&self) -> Option<QueryRecord> {
        self.query_log.read().last().cloned()
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for InMemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            procedures: Arc::clone(&self.procedures),
            query_log: Arc::clone(&self.query_log),
        }
    }
}

impl<E: Entity> fmt::Debug for InMemoryStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("rows", &self.row_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: Entity> SessionFactory<E> for InMemoryStore<E> {
    type Session = InMemorySession<E>;

    async fn open(&self) -> RepositoryResult<InMemorySession<E>> {
        Ok(InMemorySession {
            store: self.clone(),
        })
    }
}

/// A session over the shared in-memory store. Cheap to open and drop, so it
/// serves both scoped and transient repository lifetimes.
pub struct InMemorySession<E: Entity> {
    store: InMemoryStore<E>,
}

#[async_trait]
impl<E: Entity> StoreSession<E> for InMemorySession<E> {
    async fn query(
        &self,
        plan: QueryPlan<E>,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>> {
        guard_cancelled(token, "query")?;
        let snapshot: Vec<E> = self.store.rows.read().values().cloned().collect();
        let summary = plan.summary();
        let result = plan.evaluate(snapshot);
        self.store.query_log.write().push(QueryRecord {
            summary,
            rows_returned: result.len(),
        });
        Ok(result)
    }

    async fn insert(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E> {
        guard_cancelled(token, "insert")?;
        let mut rows = self.store.rows.write();
        let key = entity.key();
        if rows.contains_key(&key) {
            return Err(StoreError::constraint_violation(format!(
                "duplicate key {key:?}"
            ))
            .into());
        }
        rows.insert(key, entity.clone());
        Ok(entity)
    }

    async fn insert_bulk(
        &self,
        entities: Vec<E>,
        token: &CancellationToken,
    ) -> RepositoryResult<()> {
        guard_cancelled(token, "insert_bulk")?;
        let mut rows = self.store.rows.write();
        // Atomic batch: reject the whole set before writing anything.
        for entity in &entities {
            if rows.contains_key(&entity.key()) {
                return Err(StoreError::constraint_violation(format!(
                    "duplicate key {:?} in bulk insert",
                    entity.key()
                ))
                .into());
            }
        }
        for entity in entities {
            rows.insert(entity.key(), entity);
        }
        Ok(())
    }

    async fn update(&self, entity: E, token: &CancellationToken) -> RepositoryResult<E> {
        guard_cancelled(token, "update")?;
        let mut rows = self.store.rows.write();
        let key = entity.key();
        if !rows.contains_key(&key) {
            return Err(RepositoryError::not_found(format!(
                "update target {key:?} does not exist"
            )));
        }
        rows.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: E::Key, token: &CancellationToken) -> RepositoryResult<E> {
        guard_cancelled(token, "delete")?;
        self.store.rows.write().remove(&key).ok_or_else(|| {
            RepositoryError::not_found(format!("delete target {key:?} does not exist"))
        })
    }

    async fn execute_procedure(
        &self,
        name: &str,
        params: &ProcedureParams,
        token: &CancellationToken,
    ) -> RepositoryResult<Vec<E>> {
        guard_cancelled(token, "execute_procedure")?;
        let procedure = self
            .store
            .procedures
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ProcedureNotFound(name.to_string()))?;
        let mut rows = self.store.rows.write();
        procedure(params, &mut rows)
    }
}

/// Closure-backed projector for tests and simple entity-to-DTO maps.
pub struct FnProjector<E, D> {
    map: Arc<dyn Fn(E, &ProjectionDescriptor) -> D + Send + Sync>,
}

impl<E, D> FnProjector<E, D> {
    pub fn new(map: impl Fn(E, &ProjectionDescriptor) -> D + Send + Sync + 'static) -> Self {
        Self { map: Arc::new(map) }
    }
}

impl<E, D> Clone for FnProjector<E, D> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

#[async_trait]
impl<E, D> Projector<E, D> for FnProjector<E, D>
where
    E: Send + 'static,
    D: Send + 'static,
{
    async fn project(
        &self,
        entities: Vec<E>,
        descriptor: &ProjectionDescriptor,
    ) -> RepositoryResult<Vec<D>> {
        Ok(entities
            .into_iter()
            .map(|entity| (self.map)(entity, descriptor))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::FilterClause;
    use crate::domain::Queryable;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        label: String,
    }

    impl Entity for Item {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, label: &str) -> Item {
        Item {
            id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn basic_session_operations() {
        let store = InMemoryStore::new();
        let session = store.open().await.unwrap();
        let token = CancellationToken::new();

        session.insert(item(1, "one"), &token).await.unwrap();
        session.insert(item(2, "two"), &token).await.unwrap();
        assert_eq!(store.row_count(), 2);

        let err = session.insert(item(1, "dup"), &token).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Store(StoreError::ConstraintViolation(_))
        ));

        let updated = session.update(item(2, "TWO"), &token).await.unwrap();
        assert_eq!(updated.label, "TWO");

        let removed = session.delete(1, &token).await.unwrap();
        assert_eq!(removed.label, "one");
        assert!(session.delete(1, &token).await.is_err());
    }

    #[tokio::test]
    async fn bulk_insert_is_atomic() {
        let store = InMemoryStore::new();
        let session = store.open().await.unwrap();
        let token = CancellationToken::new();

        store.seed([item(2, "existing")]);
        let err = session
            .insert_bulk(vec![item(1, "a"), item(2, "clash")], &token)
            .await
            .unwrap_err();
        assert!(err.is_store_error());
        // Nothing from the failed batch landed.
        assert_eq!(store.row_count(), 1);
        assert!(store.row(&1).is_none());
    }

    #[tokio::test]
    async fn queries_are_logged_with_their_plan_summary() {
        let store = InMemoryStore::new();
        store.seed([item(1, "a"), item(2, "b"), item(3, "c")]);
        let session = store.open().await.unwrap();
        let token = CancellationToken::new();

        let plan = QueryPlan::new()
            .filter(FilterClause::new(|i: &Item| i.id > 1))
            .take(1);
        let rows = session.query(plan, &token).await.unwrap();
        assert_eq!(rows.len(), 1);

        let record = store.last_query().unwrap();
        assert_eq!(record.summary.filter_count, 1);
        assert_eq!(record.summary.row_cap, Some(1));
        assert_eq!(record.rows_returned, 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_every_operation() {
        let store = InMemoryStore::new();
        let session = store.open().await.unwrap();
        let token = CancellationToken::new();
        token.cancel();

        assert!(session
            .query(QueryPlan::new(), &token)
            .await
            .unwrap_err()
            .is_cancelled());
        assert!(session
            .insert(item(1, "x"), &token)
            .await
            .unwrap_err()
            .is_cancelled());
    }

    #[tokio::test]
    async fn procedures_run_against_the_row_map() {
        let store = InMemoryStore::new();
        store.seed([item(1, "keep"), item(2, "drop")]);
        store.register_procedure("purge_drops", |_params, rows| {
            let doomed: Vec<u32> = rows
                .values()
                .filter(|i| i.label == "drop")
                .map(|i| i.id)
                .collect();
            let mut removed = Vec::new();
            for key in doomed {
                if let Some(item) = rows.remove(&key) {
                    removed.push(item);
                }
            }
            Ok(removed)
        });

        let session = store.open().await.unwrap();
        let token = CancellationToken::new();
        let removed = session
            .execute_procedure("purge_drops", &ProcedureParams::new(), &token)
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(store.row_count(), 1);

        let err = session
            .execute_procedure("missing", &ProcedureParams::new(), &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Store(StoreError::ProcedureNotFound(_))
        ));
    }
}
