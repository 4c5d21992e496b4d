//! Overlapping operations while an add waits on the catalog.

use std::sync::Arc;

use async_trait::async_trait;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;
use tokio::sync::{
    Semaphore,
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

use trolley::{
    aggregator::CartAggregator,
    catalog::{CatalogError, CatalogSource, ResolvedProduct},
    errors::CartError,
    products::{ProductDisplay, ProductId},
};

/// A catalog that answers only when the test releases it.
struct GatedCatalog {
    entered: UnboundedSender<ProductId>,
    gate: Semaphore,
}

impl GatedCatalog {
    fn new() -> (Arc<Self>, UnboundedReceiver<ProductId>) {
        let (entered, receiver) = unbounded_channel();

        (
            Arc::new(Self {
                entered,
                gate: Semaphore::new(0),
            }),
            receiver,
        )
    }

    fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }
}

#[async_trait]
impl CatalogSource for GatedCatalog {
    async fn resolve(&self, product: &ProductId) -> Result<ResolvedProduct, CatalogError> {
        _ = self.entered.send(product.clone());

        self.gate
            .acquire()
            .await
            .map_err(|_err| CatalogError::Unavailable("gate closed".to_string()))?
            .forget();

        Ok(ResolvedProduct {
            price: Money::from_minor(10, USD),
            display: ProductDisplay::titled(product.as_str()),
        })
    }
}

fn spawn_add(
    cart: &Arc<CartAggregator>,
    product: &str,
    quantity: i64,
) -> tokio::task::JoinHandle<Result<trolley::cart::Cart, CartError>> {
    let cart = Arc::clone(cart);
    let product = ProductId::new(product);

    tokio::spawn(async move { cart.add_item(product, quantity).await })
}

#[tokio::test]
async fn second_add_for_pending_product_is_rejected() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    let first = spawn_add(&cart, "p1", 1);
    entered.recv().await.ok_or("catalog never called")?;

    assert!(cart.status().is_pending_for(&ProductId::new("p1")));

    let second = cart.add_item(ProductId::new("p1"), 2).await;

    assert_eq!(
        second,
        Err(CartError::ConflictingOperation(ProductId::new("p1")))
    );

    catalog.release(1);

    let snapshot = first.await??;

    assert_eq!(snapshot.item_count(), 1);
    assert!(!cart.status().is_pending());

    Ok(())
}

#[tokio::test]
async fn adds_for_different_products_overlap() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    let first = spawn_add(&cart, "p1", 1);
    let second = spawn_add(&cart, "p2", 3);

    entered.recv().await.ok_or("catalog never called")?;
    entered.recv().await.ok_or("catalog never called")?;

    assert_eq!(cart.status().pending().len(), 2);
    assert!(cart.is_empty());

    catalog.release(2);

    first.await??;
    second.await??;

    let snapshot = cart.snapshot();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.total(), Money::from_minor(40, USD));

    Ok(())
}

#[tokio::test]
async fn clear_all_succeeds_while_an_add_is_pending() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    catalog.release(1);
    cart.add_item(ProductId::new("p2"), 2).await?;
    entered.recv().await.ok_or("catalog never called")?;

    let add = spawn_add(&cart, "p1", 1);
    entered.recv().await.ok_or("catalog never called")?;

    let cleared = cart.clear_all();

    assert!(cleared.is_empty());
    assert_eq!(cleared.total(), Money::from_minor(0, USD));
    assert!(cart.status().is_pending_for(&ProductId::new("p1")));

    catalog.release(1);

    let snapshot = add.await??;

    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.line_for_product(&ProductId::new("p2")).is_none());
    assert_eq!(
        snapshot
            .line_for_product(&ProductId::new("p1"))
            .map(|line| line.quantity()),
        Some(1)
    );
    assert_eq!(snapshot.total(), Money::from_minor(10, USD));

    Ok(())
}

#[tokio::test]
async fn replace_all_waits_for_pending_adds() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    let add = spawn_add(&cart, "p1", 1);
    entered.recv().await.ok_or("catalog never called")?;

    assert_eq!(
        cart.replace_all(Vec::new()),
        Err(CartError::ConflictingOperation(ProductId::new("p1")))
    );

    catalog.release(1);
    add.await??;

    assert!(cart.replace_all(Vec::new())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn line_updates_conflict_with_a_pending_re_add() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    catalog.release(1);
    cart.add_item(ProductId::new("p1"), 1).await?;
    entered.recv().await.ok_or("catalog never called")?;

    let line = cart
        .line_for_product(&ProductId::new("p1"))
        .ok_or("missing line")?
        .id();

    let add = spawn_add(&cart, "p1", 1);
    entered.recv().await.ok_or("catalog never called")?;

    let conflict = Err(CartError::ConflictingOperation(ProductId::new("p1")));

    assert_eq!(cart.update_quantity(line, 4), conflict);
    assert_eq!(cart.remove_item(line), conflict);

    catalog.release(1);

    let snapshot = add.await??;

    assert_eq!(snapshot.get_line(line)?.quantity(), 2);

    Ok(())
}

#[tokio::test]
async fn cancelled_add_releases_the_product() -> TestResult {
    let (catalog, mut entered) = GatedCatalog::new();
    let cart = Arc::new(CartAggregator::new(catalog.clone(), USD));

    let add = spawn_add(&cart, "p1", 1);
    entered.recv().await.ok_or("catalog never called")?;

    add.abort();
    assert!(add.await.is_err_and(|err| err.is_cancelled()));

    assert!(!cart.status().is_pending());
    assert!(cart.is_empty());

    catalog.release(1);
    cart.add_item(ProductId::new("p1"), 1).await?;

    assert_eq!(cart.item_count(), 1);

    Ok(())
}
