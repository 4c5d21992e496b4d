//! Cart errors.

use thiserror::Error;

use crate::{
    catalog::CatalogError, lines::LineId, pricing::TotalPriceError, products::ProductId,
};

/// Errors returned by cart operations.
///
/// Every operation that returns one of these has left the cart exactly as it
/// was before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// A quantity was zero, negative or too large to hold.
    #[error("invalid quantity {0}")]
    InvalidQuantity(i64),

    /// No line with the given id exists.
    #[error("line {0} not found")]
    LineNotFound(LineId),

    /// The catalog could not resolve the product.
    #[error("catalog unavailable")]
    SourceUnavailable(#[source] CatalogError),

    /// A replacement payload violates a cart invariant.
    #[error("invalid cart snapshot: {0}")]
    InvalidSnapshot(SnapshotViolation),

    /// Another mutation is in flight for the same product.
    #[error("conflicting operation pending for product {0}")]
    ConflictingOperation(ProductId),

    /// A resolved price is in a different currency than the cart (price currency, cart currency).
    #[error("price has currency {found}, but cart has currency {expected}")]
    CurrencyMismatch {
        /// Cart currency code
        expected: &'static str,
        /// Price currency code
        found: &'static str,
    },

    /// The recomputed total does not fit in minor units.
    #[error("cart total overflow")]
    TotalOverflow,
}

impl From<TotalPriceError> for CartError {
    fn from(error: TotalPriceError) -> Self {
        match error {
            TotalPriceError::Overflow => Self::TotalOverflow,
        }
    }
}

/// The first problem found in a replacement payload, with the index of the
/// offending record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotViolation {
    /// Two records share a product.
    #[error("record {index} duplicates product {product}")]
    DuplicateProduct {
        /// Record index
        index: usize,
        /// Duplicated product
        product: ProductId,
    },

    /// Two records share a line id.
    #[error("record {index} duplicates line {line}")]
    DuplicateLine {
        /// Record index
        index: usize,
        /// Duplicated line id
        line: LineId,
    },

    /// A record has a zero or negative quantity.
    #[error("record {index} has non-positive quantity {quantity}")]
    NonPositiveQuantity {
        /// Record index
        index: usize,
        /// Offending quantity
        quantity: i64,
    },

    /// A record's quantity is larger than a line can hold.
    #[error("record {index} has quantity {quantity} out of range")]
    QuantityOverflow {
        /// Record index
        index: usize,
        /// Offending quantity
        quantity: i64,
    },

    /// A record is priced in another currency than the cart.
    #[error("record {index} has currency {found}, but cart has currency {expected}")]
    CurrencyMismatch {
        /// Record index
        index: usize,
        /// Cart currency code
        expected: &'static str,
        /// Record currency code
        found: &'static str,
    },
}
