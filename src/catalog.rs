//! Catalog
//!
//! The catalog is the pricing authority the cart consults when a product is
//! first added. The cart never prices anything itself: it only stores the
//! [`ResolvedProduct`] it is handed.

use std::sync::{
    PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    pricing::Price,
    products::{ProductDisplay, ProductId},
};

/// Catalog errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog has no product with this id.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
}

/// A product priced and ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    /// Unit price to snapshot into a new line
    pub price: Price,

    /// Display data to snapshot alongside the price
    pub display: ProductDisplay,
}

/// Resolves product ids into priced, displayable snapshots.
#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Resolve a single product.
    async fn resolve(&self, product: &ProductId) -> Result<ResolvedProduct, CatalogError>;
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    /// List price
    pub price: Price,

    /// Sale price, charged instead of the list price when present
    pub sale_price: Option<Price>,

    /// Display data
    pub display: ProductDisplay,
}

impl CatalogProduct {
    /// The price a new line is charged.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.sale_price.unwrap_or(self.price)
    }
}

/// In-memory catalog, standing in for the storefront backend.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<FxHashMap<ProductId, CatalogProduct>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = (ProductId, CatalogProduct)>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().collect()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Insert or replace a product.
    pub fn insert(&self, product: ProductId, entry: CatalogProduct) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product, entry);
    }

    /// Change a product's list and sale price, as a catalog update would.
    ///
    /// Returns `false` if the product is unknown.
    pub fn set_price(&self, product: &ProductId, price: Price, sale_price: Option<Price>) -> bool {
        let mut products = self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = products.get_mut(product) else {
            return false;
        };

        entry.price = price;
        entry.sale_price = sale_price;

        true
    }

    /// Simulate an outage: while set, every resolution fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Look up a catalog entry.
    #[must_use]
    pub fn get(&self, product: &ProductId) -> Option<CatalogProduct> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product)
            .cloned()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn resolve(&self, product: &ProductId) -> Result<ResolvedProduct, CatalogError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }

        let entry = self
            .get(product)
            .ok_or_else(|| CatalogError::UnknownProduct(product.clone()))?;

        debug!(%product, price = %entry.effective_price(), "resolved product");

        Ok(ResolvedProduct {
            price: entry.effective_price(),
            display: entry.display,
        })
    }
}
