//! Session Fixtures
//!
//! A scripted sequence of shopper actions, replayed against a
//! [`CartSession`] and the [`InMemoryCatalog`] backing it.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Deserialize;

use crate::{
    cart::Cart,
    catalog::InMemoryCatalog,
    fixtures::{FixtureError, catalog::parse_money},
    lines::LineId,
    products::ProductId,
    session::{CartSession, SessionError},
};

/// Wrapper for session steps in YAML
#[derive(Debug, Deserialize)]
pub struct SessionFixture {
    /// Steps, in order
    #[serde(with = "serde_norway::with::singleton_map_recursive")]
    pub steps: Vec<SessionStep>,
}

/// One scripted action.
///
/// Line-level steps name the product rather than the line; the line is looked
/// up in the cart when the step runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    /// Add a product.
    Add {
        /// Product to add
        product: ProductId,
        /// Quantity to add
        quantity: i64,
    },

    /// Set the quantity of the product's line.
    Update {
        /// Product whose line changes
        product: ProductId,
        /// New quantity
        quantity: i64,
    },

    /// The shopper pressed "+".
    Increment {
        /// Product whose line changes
        product: ProductId,
    },

    /// The shopper pressed "-".
    Decrement {
        /// Product whose line changes
        product: ProductId,
    },

    /// Remove the product's line.
    Remove {
        /// Product whose line is removed
        product: ProductId,
    },

    /// Change the catalog price of a product.
    Reprice {
        /// Product to re-price
        product: ProductId,
        /// New list price (e.g., "89.99 USD")
        price: String,
        /// New sale price
        #[serde(default)]
        sale_price: Option<String>,
    },

    /// Take the catalog offline or bring it back.
    Outage {
        /// Whether the catalog is offline
        offline: bool,
    },

    /// Empty the cart.
    Clear,
}

/// What happened when a step ran.
#[derive(Debug)]
pub enum StepOutcome {
    /// The cart accepted the step.
    Applied(Cart),

    /// The cart rejected the step; it is unchanged.
    Rejected(SessionError),

    /// The step changed the catalog, not the cart.
    CatalogChanged,
}

impl SessionStep {
    /// Run the step.
    ///
    /// # Errors
    ///
    /// Returns an error if a re-price step carries an unparseable price, or
    /// names a product the catalog does not have.
    pub async fn apply(
        &self,
        session: &CartSession,
        catalog: &InMemoryCatalog,
    ) -> Result<StepOutcome, FixtureError> {
        let result = match self {
            Self::Add { product, quantity } => {
                session.add_item(product.clone(), *quantity).await
            }
            Self::Update { product, quantity } => {
                session
                    .update_quantity(line_for(session, product), *quantity)
                    .await
            }
            Self::Increment { product } => session.increment(line_for(session, product)).await,
            Self::Decrement { product } => session.decrement(line_for(session, product)).await,
            Self::Remove { product } => session.remove_item(line_for(session, product)).await,
            Self::Clear => session.clear_all().await,
            Self::Reprice {
                product,
                price,
                sale_price,
            } => {
                let price = parse_money(price)?;
                let sale_price = sale_price.as_deref().map(parse_money).transpose()?;

                if !catalog.set_price(product, price, sale_price) {
                    return Err(FixtureError::ProductNotFound(product.to_string()));
                }

                return Ok(StepOutcome::CatalogChanged);
            }
            Self::Outage { offline } => {
                catalog.set_unavailable(*offline);

                return Ok(StepOutcome::CatalogChanged);
            }
        };

        Ok(match result {
            Ok(cart) => StepOutcome::Applied(cart),
            Err(error) => StepOutcome::Rejected(error),
        })
    }
}

// A product with no line maps to a fresh id, which the cart reports as not found.
fn line_for(session: &CartSession, product: &ProductId) -> LineId {
    session
        .aggregator()
        .line_for_product(product)
        .map_or_else(LineId::now_v7, |line| line.id())
}

impl Display for SessionStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Add { product, quantity } => write!(f, "add {quantity} x {product}"),
            Self::Update { product, quantity } => write!(f, "set {product} to {quantity}"),
            Self::Increment { product } => write!(f, "+1 {product}"),
            Self::Decrement { product } => write!(f, "-1 {product}"),
            Self::Remove { product } => write!(f, "remove {product}"),
            Self::Reprice { product, price, .. } => write!(f, "re-price {product} at {price}"),
            Self::Outage { offline: true } => write!(f, "catalog goes offline"),
            Self::Outage { offline: false } => write!(f, "catalog comes back"),
            Self::Clear => write!(f, "clear cart"),
        }
    }
}
