//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    catalog::CatalogProduct,
    fixtures::FixtureError,
    pricing::Price,
    products::{ProductDisplay, ProductId},
};

/// Wrapper for catalog products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<ProductId, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product title
    pub title: String,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// List price (e.g., "99.99 USD")
    pub price: String,

    /// Sale price, if the product is on sale
    #[serde(default)]
    pub sale_price: Option<String>,
}

impl TryFrom<ProductFixture> for CatalogProduct {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_money(&fixture.price)?;

        let sale_price = fixture
            .sale_price
            .as_deref()
            .map(parse_money)
            .transpose()?;

        if let Some(sale_price) = sale_price
            && sale_price.currency() != price.currency()
        {
            return Err(FixtureError::CurrencyMismatch(
                price.currency().iso_alpha_code.to_string(),
                sale_price.currency().iso_alpha_code.to_string(),
            ));
        }

        Ok(CatalogProduct {
            price,
            sale_price,
            display: ProductDisplay {
                title: fixture.title,
                image_ref: fixture.image,
            },
        })
    }
}

/// Parse a price string (e.g., "2.99 GBP") into money.
///
/// # Errors
///
/// Returns an error if the string is not a valid price.
pub fn parse_money(s: &str) -> Result<Price, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_minor_units() -> TestResult {
        assert_eq!(parse_price("24.99 USD")?, (24_99, USD));
        assert_eq!(parse_price("3 GBP")?, (3_00, GBP));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_negative_amount() {
        let result = parse_price("-1.00 USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn sale_price_must_share_currency() {
        let result = CatalogProduct::try_from(ProductFixture {
            title: "Tea".to_string(),
            image: None,
            price: "2.50 GBP".to_string(),
            sale_price: Some("2.00 USD".to_string()),
        });

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(..))));
    }
}
