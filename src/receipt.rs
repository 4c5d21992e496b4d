//! Receipt

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{Price, TotalPriceError},
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One printed line of a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product title at the time it was added
    pub title: String,

    /// Units of the product
    pub quantity: u32,

    /// Unit price snapshotted on the line
    pub unit_price: Price,

    /// Unit price multiplied by quantity
    pub line_total: Price,
}

/// A printable summary of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    lines: SmallVec<[ReceiptLine; 8]>,
    item_count: u64,
    total: Price,
}

impl Receipt {
    /// Build a receipt from a cart.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total overflows.
    pub fn from_cart(cart: &Cart) -> Result<Self, ReceiptError> {
        let lines = cart
            .iter()
            .map(|line| -> Result<ReceiptLine, ReceiptError> {
                Ok(ReceiptLine {
                    title: line.display().title.clone(),
                    quantity: line.quantity(),
                    unit_price: *line.price(),
                    line_total: line.total()?,
                })
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        Ok(Self {
            lines,
            item_count: cart.item_count(),
            total: cart.total(),
        })
    }

    /// Receipt lines, in cart order.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Cart total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.total
    }

    /// Writes the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{}", idx + 1),
                line.title.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        writeln!(out, " Items: {}", self.item_count).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " \x1b[1mTotal: {}\x1b[0m\n", self.total).map_err(|_err| ReceiptError::IO)
    }
}
