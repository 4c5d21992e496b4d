//! Cart Lines

use crate::{
    pricing::{Price, TotalPriceError, line_total},
    products::{ProductDisplay, ProductId},
    uuids::TypedUuid,
};

/// Cart Line Id
pub type LineId = TypedUuid<CartLine>;

/// One aggregated entry in a cart, keyed by product.
///
/// Only the quantity can change once a line exists. The price is the unit
/// price captured when the line was created and is never re-read from the
/// catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: LineId,
    product: ProductId,
    price: Price,
    quantity: u32,
    display: ProductDisplay,
}

impl CartLine {
    /// Creates a new line with a freshly generated id.
    pub(crate) fn new(
        product: ProductId,
        price: Price,
        quantity: u32,
        display: ProductDisplay,
    ) -> Self {
        Self::with_id(LineId::now_v7(), product, price, quantity, display)
    }

    pub(crate) fn with_id(
        id: LineId,
        product: ProductId,
        price: Price,
        quantity: u32,
        display: ProductDisplay,
    ) -> Self {
        Self {
            id,
            product,
            price,
            quantity,
            display,
        }
    }

    /// Returns the line id
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Returns the product this line aggregates
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Returns the snapshotted unit price
    pub fn price(&self) -> &Price {
        &self.price
    }

    /// Returns the quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the display data captured with the price
    pub fn display(&self) -> &ProductDisplay {
        &self.display
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the amount does not fit in minor units.
    pub fn total(&self) -> Result<Price, TotalPriceError> {
        line_total(&self.price, self.quantity)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Converts the line into its record form for persistence.
    #[must_use]
    pub fn to_record(&self) -> CartLineRecord {
        CartLineRecord {
            id: self.id,
            product: self.product.clone(),
            price: self.price,
            quantity: i64::from(self.quantity),
            display: self.display.clone(),
        }
    }
}

/// A line as supplied from outside the cart, e.g. restored from a persisted
/// source.
///
/// Records are not trusted: the quantity is signed so that invalid payloads
/// can be represented and rejected when the cart is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineRecord {
    /// Line id
    pub id: LineId,

    /// Product the line aggregates
    pub product: ProductId,

    /// Snapshotted unit price
    pub price: Price,

    /// Quantity, expected to be at least one
    pub quantity: i64,

    /// Display data
    pub display: ProductDisplay,
}

impl From<&CartLine> for CartLineRecord {
    fn from(line: &CartLine) -> Self {
        line.to_record()
    }
}
