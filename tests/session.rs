//! Sessions restored from a store and replayed from the storefront fixtures.

use std::sync::Arc;

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use trolley::{
    catalog::InMemoryCatalog,
    errors::{CartError, SnapshotViolation},
    fixtures::{Fixture, StepOutcome},
    lines::{CartLineRecord, LineId},
    products::{ProductDisplay, ProductId},
    session::{CartSession, SessionError},
    store::InMemoryCartStore,
};

fn record(product: &str, minor: i64, quantity: i64) -> CartLineRecord {
    CartLineRecord {
        id: LineId::now_v7(),
        product: ProductId::new(product),
        price: Money::from_minor(minor, USD),
        quantity,
        display: ProductDisplay::titled(product),
    }
}

#[tokio::test]
async fn restore_seeds_the_cart_from_the_store() -> TestResult {
    let store = Arc::new(InMemoryCartStore::with_records(vec![
        record("p1", 10, 2),
        record("p2", 25, 1),
    ]));

    let session =
        CartSession::restore(Arc::new(InMemoryCatalog::new()), store.clone(), USD).await?;

    let cart = session.cart();

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), Money::from_minor(45, USD));

    let line = cart
        .line_for_product(&ProductId::new("p1"))
        .ok_or("missing line")?
        .id();

    session.remove_item(line).await?;

    assert_eq!(store.records().len(), 1);

    Ok(())
}

#[tokio::test]
async fn corrupt_store_contents_are_rejected() -> TestResult {
    let store = Arc::new(InMemoryCartStore::with_records(vec![
        record("p1", 10, 2),
        record("p2", 25, 0),
    ]));

    let result = CartSession::restore(Arc::new(InMemoryCatalog::new()), store, USD).await;

    assert!(
        matches!(
            result,
            Err(SessionError::Cart(CartError::InvalidSnapshot(
                SnapshotViolation::NonPositiveQuantity { index: 1, quantity: 0 }
            )))
        ),
        "expected NonPositiveQuantity, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn storefront_script_replays_to_the_expected_cart() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let catalog = Arc::new(fixture.catalog());
    let store = Arc::new(InMemoryCartStore::new());

    let session = CartSession::restore(catalog.clone(), store.clone(), fixture.currency()?).await?;

    let mut rejected = 0;

    for step in fixture.steps() {
        if let StepOutcome::Rejected(_) = step.apply(&session, &catalog).await? {
            rejected += 1;
        }
    }

    let cart = session.cart();
    let headphones = cart
        .line_for_product(&ProductId::new("headphones"))
        .ok_or("missing headphones")?;

    // Re-price happened after the first add: the sale price sticks.
    assert_eq!(*headphones.price(), Money::from_minor(79_99, USD));
    assert_eq!(headphones.quantity(), 3);

    assert!(cart.line_for_product(&ProductId::new("smartwatch")).is_none());
    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.total(), Money::from_minor(389_96, USD));
    assert_eq!(rejected, 3);
    assert_eq!(store.records(), cart.to_records());

    Ok(())
}
