//! Cart aggregator
//!
//! [`CartAggregator`] owns one [`Cart`] and serialises every mutation on it.
//! Adding an item is the only operation that suspends: it waits on the
//! [`CatalogSource`] without holding the cart lock, with the product marked
//! pending in the meantime.
//!
//! Conflicts are rejected, not queued. While an add is pending for a product:
//!
//! - another add for the same product fails with [`CartError::ConflictingOperation`];
//! - updates and removals of that product's line fail the same way;
//! - [`CartAggregator::replace_all`] fails the same way, as the snapshot it
//!   installs would have to be merged with the pending line.
//!
//! [`CartAggregator::clear_all`] always succeeds: a pending add lands in the
//! emptied cart once the catalog answers.
//!
//! Adds for different products run concurrently.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rusty_money::iso::Currency;
use tracing::{Span, info, warn};

use crate::{
    cart::Cart,
    catalog::CatalogSource,
    errors::CartError,
    lines::{CartLine, CartLineRecord, LineId},
    products::ProductId,
    status::{CartStatus, OperationKind},
};

#[derive(Debug)]
struct CartState {
    cart: Cart,
    status: CartStatus,
}

/// Owns a cart and applies operations to it.
pub struct CartAggregator {
    catalog: Arc<dyn CatalogSource>,
    state: Mutex<CartState>,
}

impl CartAggregator {
    /// Create an aggregator with an empty cart.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>, currency: &'static Currency) -> Self {
        Self::with_cart(catalog, Cart::new(currency))
    }

    /// Create an aggregator around an existing cart.
    #[must_use]
    pub fn with_cart(catalog: Arc<dyn CatalogSource>, cart: Cart) -> Self {
        Self {
            catalog,
            state: Mutex::new(CartState {
                cart,
                status: CartStatus::default(),
            }),
        }
    }

    /// Add `quantity` of a product, resolving its price through the catalog.
    ///
    /// The cart is untouched until the catalog answers. An existing line for
    /// the product keeps its price and only grows in quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is not positive or the merged quantity overflows.
    /// - [`CartError::ConflictingOperation`]: an add for this product is already pending.
    /// - [`CartError::SourceUnavailable`]: the catalog could not resolve the product.
    /// - [`CartError::CurrencyMismatch`]: the catalog priced the product in another currency.
    /// - [`CartError::TotalOverflow`]: the new total does not fit in minor units.
    #[tracing::instrument(
        name = "cart.add_item",
        skip(self, product),
        fields(product = %product, line_id = tracing::field::Empty)
    )]
    pub async fn add_item(&self, product: ProductId, quantity: i64) -> Result<Cart, CartError> {
        if quantity <= 0 || u32::try_from(quantity).is_err() {
            return Err(self.fail(OperationKind::AddItem, CartError::InvalidQuantity(quantity)));
        }

        let pending = PendingAdd::register(self, &product)?;

        let resolved = self.catalog.resolve(&product).await;

        pending.complete(|state| {
            let result = resolved
                .map_err(CartError::SourceUnavailable)
                .and_then(|resolved| state.cart.add_resolved(product, quantity, resolved));

            match result {
                Ok(line) => {
                    Span::current().record("line_id", tracing::field::display(line));
                    state.status.record_success(OperationKind::AddItem);

                    info!(line_id = %line, total = %state.cart.total(), "added item");

                    Ok(state.cart.clone())
                }
                Err(error) => {
                    warn!(%error, "add item failed");
                    state
                        .status
                        .record_failure(OperationKind::AddItem, error.clone());

                    Err(error)
                }
            }
        })
    }

    /// Replace a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line has this id.
    /// - [`CartError::ConflictingOperation`]: an add is pending for the line's product.
    /// - [`CartError::InvalidQuantity`]: `quantity` is larger than a line can hold.
    #[tracing::instrument(name = "cart.update_quantity", skip(self, line), fields(line_id = %line))]
    pub fn update_quantity(&self, line: LineId, quantity: i64) -> Result<Cart, CartError> {
        self.mutate(
            OperationKind::UpdateQuantity,
            |state| line_conflict(state, line),
            |cart| cart.update_quantity(line, quantity),
        )
    }

    /// Add one to a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`CartAggregator::update_quantity`].
    #[tracing::instrument(name = "cart.increment", skip(self, line), fields(line_id = %line))]
    pub fn increment(&self, line: LineId) -> Result<Cart, CartError> {
        self.mutate(
            OperationKind::UpdateQuantity,
            |state| line_conflict(state, line),
            |cart| cart.increment(line),
        )
    }

    /// Take one from a line's quantity, removing it when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`CartAggregator::update_quantity`].
    #[tracing::instrument(name = "cart.decrement", skip(self, line), fields(line_id = %line))]
    pub fn decrement(&self, line: LineId) -> Result<Cart, CartError> {
        self.mutate(
            OperationKind::UpdateQuantity,
            |state| line_conflict(state, line),
            |cart| cart.decrement(line),
        )
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line has this id, including when it was already removed.
    /// - [`CartError::ConflictingOperation`]: an add is pending for the line's product.
    #[tracing::instrument(name = "cart.remove_item", skip(self, line), fields(line_id = %line))]
    pub fn remove_item(&self, line: LineId) -> Result<Cart, CartError> {
        self.mutate(
            OperationKind::RemoveItem,
            |state| line_conflict(state, line),
            |cart| cart.remove(line).map(drop),
        )
    }

    /// Replace every line with an authoritative snapshot.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidSnapshot`]: a record violates a cart invariant; nothing changes.
    /// - [`CartError::ConflictingOperation`]: an add is pending.
    #[tracing::instrument(
        name = "cart.replace_all",
        skip(self, records),
        fields(record_count = records.len())
    )]
    pub fn replace_all(&self, records: Vec<CartLineRecord>) -> Result<Cart, CartError> {
        self.mutate(OperationKind::ReplaceAll, any_pending, |cart| {
            cart.replace_all(records)
        })
    }

    /// Remove every line. Never fails, even while adds are pending.
    #[tracing::instrument(name = "cart.clear_all", skip(self))]
    pub fn clear_all(&self) -> Cart {
        let mut state = self.lock();

        state.cart.clear();
        state.status.record_success(OperationKind::ClearAll);

        info!(pending = state.status.pending().len(), "cart cleared");

        state.cart.clone()
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// A copy of the current pending and error state.
    #[must_use]
    pub fn status(&self) -> CartStatus {
        self.lock().status.clone()
    }

    /// Forget the most recent failure.
    pub fn clear_error(&self) {
        self.lock().status.clear_error();
    }

    /// Get a line by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id.
    pub fn line(&self, line: LineId) -> Result<CartLine, CartError> {
        self.lock().cart.get_line(line).cloned()
    }

    /// Get the line holding a product, if any.
    #[must_use]
    pub fn line_for_product(&self, product: &ProductId) -> Option<CartLine> {
        self.lock().cart.line_for_product(product).cloned()
    }

    /// The sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().cart.item_count()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().cart.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&self, kind: OperationKind, error: CartError) -> CartError {
        warn!(operation = %kind, %error, "cart operation rejected");
        self.lock().status.record_failure(kind, error.clone());

        error
    }

    fn mutate(
        &self,
        kind: OperationKind,
        conflict: impl FnOnce(&CartState) -> Option<ProductId>,
        operation: impl FnOnce(&mut Cart) -> Result<(), CartError>,
    ) -> Result<Cart, CartError> {
        let mut state = self.lock();

        let result = match conflict(&*state) {
            Some(product) => Err(CartError::ConflictingOperation(product)),
            None => operation(&mut state.cart),
        };

        match result {
            Ok(()) => {
                state.status.record_success(kind);

                info!(
                    operation = %kind,
                    lines = state.cart.len(),
                    total = %state.cart.total(),
                    "cart updated"
                );

                Ok(state.cart.clone())
            }
            Err(error) => {
                warn!(operation = %kind, %error, "cart operation rejected");
                state.status.record_failure(kind, error.clone());

                Err(error)
            }
        }
    }
}

impl Debug for CartAggregator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartAggregator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn line_conflict(state: &CartState, line: LineId) -> Option<ProductId> {
    let product = state.cart.get_line(line).ok()?.product();

    state
        .status
        .is_pending_for(product)
        .then(|| product.clone())
}

fn any_pending(state: &CartState) -> Option<ProductId> {
    state.status.pending().first().cloned()
}

/// A product registered as pending while its add waits on the catalog.
///
/// Dropping it without completing (e.g. when the add future is cancelled)
/// releases the registration, so the add has no effect at all.
struct PendingAdd<'a> {
    aggregator: &'a CartAggregator,
    product: ProductId,
    completed: bool,
}

impl<'a> PendingAdd<'a> {
    fn register(aggregator: &'a CartAggregator, product: &ProductId) -> Result<Self, CartError> {
        if !aggregator.lock().status.begin(product) {
            return Err(aggregator.fail(
                OperationKind::AddItem,
                CartError::ConflictingOperation(product.clone()),
            ));
        }

        Ok(Self {
            aggregator,
            product: product.clone(),
            completed: false,
        })
    }

    /// Release the registration and apply the add in one critical section.
    fn complete<R>(mut self, apply: impl FnOnce(&mut CartState) -> R) -> R {
        let mut state = self.aggregator.lock();

        state.status.finish(&self.product);
        self.completed = true;

        apply(&mut *state)
    }
}

impl Drop for PendingAdd<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.aggregator.lock().status.finish(&self.product);
        }
    }
}
