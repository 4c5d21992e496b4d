//! Pricing

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::lines::CartLine;

/// A unit or aggregate price in a fixed ISO currency.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while calculating a total price.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TotalPriceError {
    /// The amount does not fit in `i64` minor units.
    #[error("total exceeds the representable amount")]
    Overflow,
}

/// Unit price multiplied by a quantity, in the unit price's currency.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product overflows.
pub fn line_total(price: &Price, quantity: u32) -> Result<Price, TotalPriceError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Calculates the total of a list of lines from scratch.
///
/// The sum runs in integer minor units in line order, so the result is exact
/// and the same for every call on the same lines. Lines are assumed to share
/// `currency`; the cart enforces that before lines reach here.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if any line total or the running sum overflows.
pub fn total_price(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Price, TotalPriceError> {
    let minor = lines.iter().try_fold(0_i64, |acc, line| {
        let line_minor = line.total()?.to_minor_units();

        acc.checked_add(line_minor).ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_minor(minor, currency))
}
