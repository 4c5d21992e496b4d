//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{CatalogProduct, InMemoryCatalog},
    fixtures::{catalog::CatalogFixture, sessions::SessionFixture},
    products::ProductId,
};

pub mod catalog;
pub mod sessions;

pub use sessions::{SessionStep, StepOutcome};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog entries keyed by product id
    products: FxHashMap<ProductId, CatalogProduct>,

    /// Scripted session steps, in order
    steps: Vec<SessionStep>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            steps: Vec::new(),
            currency: None,
        }
    }

    /// Load catalog products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let product = CatalogProduct::try_from(product_fixture)?;
            let currency = product.price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load a scripted session from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_session(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("sessions").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: SessionFixture = serde_norway::from_str(&contents)?;

        self.steps.extend(fixture.steps);

        Ok(self)
    }

    /// Load a complete fixture set (catalog and session with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?.load_session(name)?;

        Ok(fixture)
    }

    /// Get a catalog product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&CatalogProduct, FixtureError> {
        self.products
            .get(&ProductId::new(key))
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Build an in-memory catalog from the loaded products
    #[must_use]
    pub fn catalog(&self) -> InMemoryCatalog {
        InMemoryCatalog::with_products(
            self.products
                .iter()
                .map(|(id, product)| (id.clone(), product.clone())),
        )
    }

    /// Get the scripted session steps
    #[must_use]
    pub fn steps(&self) -> &[SessionStep] {
        &self.steps
    }

    /// Get the currency shared by every loaded product
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}
