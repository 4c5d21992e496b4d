//! Cart
//!
//! [`Cart`] is the line collection and its derived total. Every mutation
//! builds the resulting line list first, recomputes the total from it, and
//! only then commits both, so a failed operation never leaves a partial
//! change behind.

use rusty_money::{Money, iso::Currency};
use rustc_hash::FxHashSet;

use crate::{
    catalog::ResolvedProduct,
    errors::{CartError, SnapshotViolation},
    lines::{CartLine, CartLineRecord, LineId},
    pricing::{Price, total_price},
    products::ProductId,
};

/// Cart
///
/// Holds at most one line per product, every line has a quantity of at least
/// one, and `total` always equals the sum of price times quantity over the
/// lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Price,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            total: Money::from_minor(0, currency),
            currency,
        }
    }

    /// Create a cart from a set of records.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Cart::replace_all`].
    pub fn with_records(
        records: impl IntoIterator<Item = CartLineRecord>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);

        cart.replace_all(records)?;

        Ok(cart)
    }

    /// Add `quantity` of a product, using `resolved` for a new line's price
    /// and display data.
    ///
    /// If the product already has a line, its quantity grows and its price is
    /// kept: `resolved` is ignored, so re-adding never re-prices a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is not positive, or the new quantity overflows.
    /// - [`CartError::CurrencyMismatch`]: a new line would be priced in another currency.
    /// - [`CartError::TotalOverflow`]: the new total does not fit in minor units.
    pub fn add_resolved(
        &mut self,
        product: ProductId,
        quantity: i64,
        resolved: ResolvedProduct,
    ) -> Result<LineId, CartError> {
        let quantity = positive_quantity(quantity)?;
        let mut lines = self.lines.clone();

        let id = if let Some(line) = lines.iter_mut().find(|line| *line.product() == product) {
            let merged = line
                .quantity()
                .checked_add(quantity)
                .ok_or(CartError::InvalidQuantity(i64::from(quantity)))?;

            line.set_quantity(merged);

            line.id()
        } else {
            self.check_currency(&resolved.price)?;

            let line = CartLine::new(product, resolved.price, quantity, resolved.display);
            let id = line.id();

            lines.push(line);

            id
        };

        self.commit(lines)?;

        Ok(id)
    }

    /// Replace a line's quantity. A quantity of zero or less removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line has this id.
    /// - [`CartError::InvalidQuantity`]: `quantity` is larger than a line can hold.
    /// - [`CartError::TotalOverflow`]: the new total does not fit in minor units.
    pub fn update_quantity(&mut self, line: LineId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove(line).map(drop);
        }

        let mut lines = self.lines.clone();

        let target = lines
            .iter_mut()
            .find(|candidate| candidate.id() == line)
            .ok_or(CartError::LineNotFound(line))?;

        target.set_quantity(positive_quantity(quantity)?);

        self.commit(lines)
    }

    /// Add one to a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Cart::update_quantity`].
    pub fn increment(&mut self, line: LineId) -> Result<(), CartError> {
        let current = self.get_line(line)?.quantity();

        self.update_quantity(line, i64::from(current) + 1)
    }

    /// Take one from a line's quantity, removing the line when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Cart::update_quantity`].
    pub fn decrement(&mut self, line: LineId) -> Result<(), CartError> {
        let current = self.get_line(line)?.quantity();

        self.update_quantity(line, i64::from(current) - 1)
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id, including
    /// when it was already removed.
    pub fn remove(&mut self, line: LineId) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|candidate| candidate.id() == line)
            .ok_or(CartError::LineNotFound(line))?;

        let mut lines = self.lines.clone();
        let removed = lines.remove(position);

        self.commit(lines)?;

        Ok(removed)
    }

    /// Replace every line with the given records, in record order.
    ///
    /// All records are validated before anything changes; on error the cart
    /// is untouched.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidSnapshot`]: a record duplicates a product or line
    ///   id, has a quantity outside `1..=u32::MAX`, or is priced in another currency.
    /// - [`CartError::TotalOverflow`]: the new total does not fit in minor units.
    pub fn replace_all(
        &mut self,
        records: impl IntoIterator<Item = CartLineRecord>,
    ) -> Result<(), CartError> {
        let lines = self.validate_records(records)?;

        self.commit(lines)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total = Money::from_minor(0, self.currency);
    }

    /// Get a line by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id.
    pub fn get_line(&self, line: LineId) -> Result<&CartLine, CartError> {
        self.lines
            .iter()
            .find(|candidate| candidate.id() == line)
            .ok_or(CartError::LineNotFound(line))
    }

    /// Get the line holding a product, if any.
    #[must_use]
    pub fn line_for_product(&self, product: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product() == product)
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// The lines as records, ready to persist.
    #[must_use]
    pub fn to_records(&self) -> Vec<CartLineRecord> {
        self.lines.iter().map(CartLine::to_record).collect()
    }

    /// The total of all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.total
    }

    /// The sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn commit(&mut self, lines: Vec<CartLine>) -> Result<(), CartError> {
        let total = total_price(&lines, self.currency)?;

        self.lines = lines;
        self.total = total;

        Ok(())
    }

    fn check_currency(&self, price: &Price) -> Result<(), CartError> {
        let price_currency = price.currency();

        if price_currency == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                found: price_currency.iso_alpha_code,
            })
        }
    }

    fn validate_records(
        &self,
        records: impl IntoIterator<Item = CartLineRecord>,
    ) -> Result<Vec<CartLine>, CartError> {
        let mut products = FxHashSet::default();
        let mut ids = FxHashSet::default();
        let mut lines = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let violation = if record.quantity <= 0 {
                Some(SnapshotViolation::NonPositiveQuantity {
                    index,
                    quantity: record.quantity,
                })
            } else if u32::try_from(record.quantity).is_err() {
                Some(SnapshotViolation::QuantityOverflow {
                    index,
                    quantity: record.quantity,
                })
            } else if record.price.currency() != self.currency {
                Some(SnapshotViolation::CurrencyMismatch {
                    index,
                    expected: self.currency.iso_alpha_code,
                    found: record.price.currency().iso_alpha_code,
                })
            } else if !products.insert(record.product.clone()) {
                Some(SnapshotViolation::DuplicateProduct {
                    index,
                    product: record.product.clone(),
                })
            } else if !ids.insert(record.id) {
                Some(SnapshotViolation::DuplicateLine {
                    index,
                    line: record.id,
                })
            } else {
                None
            };

            if let Some(violation) = violation {
                return Err(CartError::InvalidSnapshot(violation));
            }

            let quantity = positive_quantity(record.quantity)?;

            lines.push(CartLine::with_id(
                record.id,
                record.product,
                record.price,
                quantity,
                record.display,
            ));
        }

        Ok(lines)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    u32::try_from(quantity).map_err(|_err| CartError::InvalidQuantity(quantity))
}
