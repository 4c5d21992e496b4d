//! Cart session
//!
//! Glue between a [`CartAggregator`] and a [`CartStore`]: seeds the cart from
//! the store at start-up and saves the lines after every successful
//! mutation. Failed mutations are never saved.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    aggregator::CartAggregator,
    cart::Cart,
    catalog::CatalogSource,
    errors::CartError,
    lines::{CartLineRecord, LineId},
    products::ProductId,
    store::{CartStore, StoreError},
};

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cart rejected the operation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The cart changed but could not be saved.
    #[error("failed to save cart")]
    Store(#[from] StoreError),
}

/// A cart session backed by a store.
pub struct CartSession {
    aggregator: CartAggregator,
    store: Arc<dyn CartStore>,
}

impl CartSession {
    /// Start a session, seeding the cart with whatever the store holds.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Store`]: the store could not be loaded.
    /// - [`SessionError::Cart`]: the stored lines are not a valid cart.
    #[tracing::instrument(name = "session.restore", skip_all)]
    pub async fn restore(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn CartStore>,
        currency: &'static Currency,
    ) -> Result<Self, SessionError> {
        let records = store.load().await?;
        let aggregator = CartAggregator::new(catalog, currency);

        let cart = aggregator.replace_all(records)?;

        info!(lines = cart.len(), total = %cart.total(), "restored cart");

        Ok(Self { aggregator, store })
    }

    /// The underlying aggregator, for reads.
    #[must_use]
    pub fn aggregator(&self) -> &CartAggregator {
        &self.aggregator
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.aggregator.snapshot()
    }

    /// Add a product and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::add_item`], or a store error.
    pub async fn add_item(&self, product: ProductId, quantity: i64) -> Result<Cart, SessionError> {
        let cart = self.aggregator.add_item(product, quantity).await?;

        self.save(cart).await
    }

    /// Replace a line's quantity and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::update_quantity`], or a store error.
    pub async fn update_quantity(&self, line: LineId, quantity: i64) -> Result<Cart, SessionError> {
        let cart = self.aggregator.update_quantity(line, quantity)?;

        self.save(cart).await
    }

    /// Add one to a line's quantity and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::increment`], or a store error.
    pub async fn increment(&self, line: LineId) -> Result<Cart, SessionError> {
        let cart = self.aggregator.increment(line)?;

        self.save(cart).await
    }

    /// Take one from a line's quantity and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::decrement`], or a store error.
    pub async fn decrement(&self, line: LineId) -> Result<Cart, SessionError> {
        let cart = self.aggregator.decrement(line)?;

        self.save(cart).await
    }

    /// Remove a line and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::remove_item`], or a store error.
    pub async fn remove_item(&self, line: LineId) -> Result<Cart, SessionError> {
        let cart = self.aggregator.remove_item(line)?;

        self.save(cart).await
    }

    /// Replace every line and save.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CartAggregator::replace_all`], or a store error.
    pub async fn replace_all(&self, records: Vec<CartLineRecord>) -> Result<Cart, SessionError> {
        let cart = self.aggregator.replace_all(records)?;

        self.save(cart).await
    }

    /// Empty the cart and save.
    ///
    /// # Errors
    ///
    /// Returns a store error if the emptied cart cannot be saved.
    pub async fn clear_all(&self) -> Result<Cart, SessionError> {
        let cart = self.aggregator.clear_all();

        self.save(cart).await
    }

    async fn save(&self, cart: Cart) -> Result<Cart, SessionError> {
        self.store.save(&cart.to_records()).await?;

        debug!(lines = cart.len(), "saved cart");

        Ok(cart)
    }
}

impl Debug for CartSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSession")
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        catalog::{MockCatalogSource, ResolvedProduct},
        products::ProductDisplay,
        store::MockCartStore,
    };

    use super::*;

    #[tokio::test]
    async fn failed_mutation_is_not_saved() -> TestResult {
        let mut store = MockCartStore::new();
        store.expect_load().times(1).returning(|| Ok(Vec::new()));
        store.expect_save().never();

        let session = CartSession::restore(
            Arc::new(MockCatalogSource::new()),
            Arc::new(store),
            USD,
        )
        .await?;

        let result = session.remove_item(LineId::now_v7()).await;

        assert!(
            matches!(result, Err(SessionError::Cart(CartError::LineNotFound(_)))),
            "expected LineNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn successful_add_saves_lines() -> TestResult {
        let mut catalog = MockCatalogSource::new();
        catalog.expect_resolve().returning(|_| {
            Ok(ResolvedProduct {
                price: Money::from_minor(10, USD),
                display: ProductDisplay::titled("Sample Product"),
            })
        });

        let mut store = MockCartStore::new();
        store.expect_load().returning(|| Ok(Vec::new()));
        store
            .expect_save()
            .withf(|records| records.len() == 1 && records.iter().all(|r| r.quantity == 2))
            .times(1)
            .returning(|_| Ok(()));

        let session = CartSession::restore(Arc::new(catalog), Arc::new(store), USD).await?;

        let cart = session.add_item(ProductId::new("p1"), 2).await?;

        assert_eq!(cart.total(), Money::from_minor(20, USD));

        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_reported() -> TestResult {
        let mut store = MockCartStore::new();
        store.expect_load().returning(|| Ok(Vec::new()));
        store
            .expect_save()
            .returning(|_| Err(StoreError::Unavailable("disk full".to_string())));

        let session = CartSession::restore(
            Arc::new(MockCatalogSource::new()),
            Arc::new(store),
            USD,
        )
        .await?;

        let result = session.clear_all().await;

        assert!(
            matches!(result, Err(SessionError::Store(_))),
            "expected Store error, got {result:?}"
        );

        Ok(())
    }
}
