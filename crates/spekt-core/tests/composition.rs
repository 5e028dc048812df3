//! Composed read-model assembly, batch verification and task orchestration

use spekt_core::infrastructure::InMemoryStore;
use spekt_core::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: u32,
    name: String,
    category: String,
    featured: bool,
}

impl Entity for Product {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

fn product(id: u32, name: &str, category: &str, featured: bool) -> Product {
    Product {
        id,
        name: name.to_string(),
        category: category.to_string(),
        featured,
    }
}

fn seeded_store() -> Arc<InMemoryStore<Product>> {
    let store = InMemoryStore::new();
    store.seed([
        product(1, "anvil", "hardware", false),
        product(2, "rocket", "vehicles", true),
        product(3, "magnet", "hardware", false),
        product(4, "tunnel paint", "decor", false),
    ]);
    Arc::new(store)
}

#[derive(Debug, Default)]
struct CatalogPage {
    hardware: Vec<Product>,
    flagship: Option<Product>,
}

#[tokio::test]
async fn composed_assembly_populates_every_field() {
    let store = seeded_store();
    let repo = Arc::new(Repository::scoped(store).await.unwrap());
    let token = CancellationToken::new();

    let fields = vec![
        ComposedField::collection(
            "hardware",
            Arc::clone(&repo),
            Specification::builder("hardware products")
                .filter(|p: &Product| p.category == "hardware")
                .build(),
            |page: &mut CatalogPage, rows| page.hardware = rows,
        ),
        ComposedField::scalar(
            "flagship",
            Arc::clone(&repo),
            Specification::builder("featured product")
                .filter(|p: &Product| p.featured)
                .build(),
            |page: &mut CatalogPage, entity| page.flagship = Some(entity),
        ),
    ];

    let page = assemble_composed(fields, &token).await.unwrap();
    assert_eq!(page.hardware.len(), 2);
    assert_eq!(page.hardware[0].name, "anvil");
    assert_eq!(page.flagship.unwrap().name, "rocket");
}

#[tokio::test]
async fn failing_scalar_field_aborts_before_later_fields_run() {
    let store = seeded_store();
    let repo = Arc::new(Repository::scoped(store.clone()).await.unwrap());
    let token = CancellationToken::new();

    let fields = vec![
        ComposedField::scalar(
            "flagship",
            Arc::clone(&repo),
            Specification::builder("discontinued flagship")
                .filter(|p: &Product| p.featured && p.id > 100)
                .build(),
            |page: &mut CatalogPage, entity| page.flagship = Some(entity),
        ),
        ComposedField::collection(
            "hardware",
            Arc::clone(&repo),
            Specification::builder("hardware products")
                .filter(|p: &Product| p.category == "hardware")
                .build(),
            |page: &mut CatalogPage, rows| page.hardware = rows,
        ),
    ];

    let error = assemble_composed(fields, &token).await.unwrap_err();
    assert!(matches!(error, RepositoryError::EmptyResult(_)));
    // Only the failing scalar probe reached the store.
    assert_eq!(store.query_log().len(), 1);
}

#[tokio::test]
async fn batch_verification_reports_every_mismatch() {
    let store = seeded_store();
    let repo = Arc::new(Repository::scoped(store).await.unwrap());
    let token = CancellationToken::new();

    let expectations = vec![
        Expectation::exists(
            Arc::clone(&repo),
            Verification::builder("some hardware")
                .filter(|p: &Product| p.category == "hardware")
                .build(),
            true,
            "expected hardware products",
        ),
        Expectation::exists(
            Arc::clone(&repo),
            Verification::builder("no food")
                .filter(|p: &Product| p.category == "food")
                .build(),
            true,
            "expected food products",
        ),
        Expectation::exists_unique(
            Arc::clone(&repo),
            Verification::builder("one flagship")
                .filter(|p: &Product| p.featured)
                .build(),
            true,
            "expected exactly one featured product",
        ),
        Expectation::exists_unique(
            Arc::clone(&repo),
            Verification::builder("one hardware")
                .filter(|p: &Product| p.category == "hardware")
                .build(),
            true,
            "expected exactly one hardware product",
        ),
    ];

    let error = verify_all(expectations, &token).await.unwrap_err();
    match error {
        RepositoryError::ValidationAggregate(messages) => {
            assert_eq!(
                messages,
                vec![
                    "expected food products".to_string(),
                    "expected exactly one hardware product".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn batch_verification_passes_when_every_expectation_holds() {
    let store = seeded_store();
    let repo = Arc::new(Repository::scoped(store).await.unwrap());
    let token = CancellationToken::new();

    let expectations = vec![
        Expectation::exists(
            Arc::clone(&repo),
            Verification::builder("some decor")
                .filter(|p: &Product| p.category == "decor")
                .build(),
            true,
            "expected decor products",
        ),
        Expectation::exists(
            Arc::clone(&repo),
            Verification::builder("no food")
                .filter(|p: &Product| p.category == "food")
                .build(),
            false,
            "expected no food products",
        ),
    ];

    verify_all(expectations, &token).await.unwrap();
}

#[tokio::test]
async fn batch_verification_propagates_cancellation_immediately() {
    let store = seeded_store();
    let repo = Arc::new(Repository::scoped(store).await.unwrap());
    let token = CancellationToken::new();
    token.cancel();

    let expectations = vec![Expectation::exists(
        repo,
        Verification::builder("anything")
            .filter(|_: &Product| true)
            .build(),
        true,
        "never evaluated as a mismatch",
    )];

    let error = verify_all(expectations, &token).await.unwrap_err();
    assert!(error.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn dependent_failure_cancels_slow_siblings_promptly() {
    let mut group = TaskGroup::new();
    let observed_cancel = Arc::new(AtomicBool::new(false));

    let sibling_token = group.token();
    let flag = Arc::clone(&observed_cancel);
    group.spawn(async move {
        tokio::select! {
            _ = sibling_token.cancelled() => {
                flag.store(true, Ordering::SeqCst);
                Err(RepositoryError::cancelled("sibling fetch"))
            }
            _ = sleep(Duration::from_millis(50)) => Ok(1),
        }
    });
    group.spawn(async {
        sleep(Duration::from_millis(10)).await;
        Err(RepositoryError::empty_result("required rows missing"))
    });

    let start = Instant::now();
    let error = group.join_dependent().await.unwrap_err();

    assert!(matches!(error, RepositoryError::EmptyResult(_)));
    // The sibling reacted to the cancellation, not to its own timeout.
    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(observed_cancel.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn independent_failures_leave_siblings_untouched() {
    let mut group = TaskGroup::new();
    let token = group.token();

    group.spawn(async { Err(RepositoryError::not_found("missing row")) });
    group.spawn(async {
        sleep(Duration::from_millis(20)).await;
        Ok(7)
    });

    let outcomes = group.join_independent().await;
    assert_eq!(outcomes.len(), 2);
    assert!(!token.is_cancelled());
    assert!(outcomes.iter().any(|o| matches!(o, Ok(v) if *v == 7)));
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, Err(RepositoryError::NotFound(_)))));
}

#[tokio::test]
async fn task_group_resolves_repository_reads_concurrently() {
    let store = seeded_store();
    let repo = Arc::new(Repository::transient(store));

    let mut group = TaskGroup::new();
    let token = group.token();
    for category in ["hardware", "vehicles", "decor"] {
        let repo = Arc::clone(&repo);
        let token = token.clone();
        group.spawn(async move {
            let spec = Specification::builder(format!("{category} products"))
                .filter(move |p: &Product| p.category == category)
                .build();
            repo.get(Some(&spec), &token).await
        });
    }

    let batches = group.join_dependent().await.unwrap();
    let total: usize = batches.iter().map(Vec::len).sum();
    assert_eq!(total, 4);
}
