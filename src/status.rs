//! Operation status
//!
//! Tracks which adds are waiting on the catalog and the most recent failure,
//! for callers that render loading and error states.

use std::fmt::{Display, Formatter, Result as FmtResult};

use smallvec::SmallVec;

use crate::{errors::CartError, products::ProductId};

/// Cart operations, as reported in status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Add a product
    AddItem,
    /// Replace a line's quantity
    UpdateQuantity,
    /// Remove a line
    RemoveItem,
    /// Replace every line
    ReplaceAll,
    /// Remove every line
    ClearAll,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::AddItem => "add_item",
            Self::UpdateQuantity => "update_quantity",
            Self::RemoveItem => "remove_item",
            Self::ReplaceAll => "replace_all",
            Self::ClearAll => "clear_all",
        };

        f.write_str(name)
    }
}

/// The most recent failed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedOperation {
    /// Which operation failed
    pub kind: OperationKind,

    /// Why it failed
    pub error: CartError,
}

/// Pending and error state of a cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartStatus {
    pending: SmallVec<[ProductId; 4]>,
    last_error: Option<FailedOperation>,
}

impl CartStatus {
    /// Check if any add is waiting on the catalog.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Check if an add for this product is waiting on the catalog.
    #[must_use]
    pub fn is_pending_for(&self, product: &ProductId) -> bool {
        self.pending.contains(product)
    }

    /// Products with an add waiting on the catalog, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[ProductId] {
        &self.pending
    }

    /// The most recent failure, if not cleared since.
    #[must_use]
    pub fn last_error(&self) -> Option<&FailedOperation> {
        self.last_error.as_ref()
    }

    /// Forget the most recent failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Mark a product as pending. Returns `false` if it already was.
    pub(crate) fn begin(&mut self, product: &ProductId) -> bool {
        if self.is_pending_for(product) {
            return false;
        }

        self.pending.push(product.clone());

        true
    }

    pub(crate) fn finish(&mut self, product: &ProductId) {
        self.pending.retain(|pending| pending != product);
    }

    pub(crate) fn record_failure(&mut self, kind: OperationKind, error: CartError) {
        self.last_error = Some(FailedOperation { kind, error });
    }

    /// A success clears a failure of the same kind.
    pub(crate) fn record_success(&mut self, kind: OperationKind) {
        if self
            .last_error
            .as_ref()
            .is_some_and(|failed| failed.kind == kind)
        {
            self.last_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lines::LineId;

    use super::*;

    #[test]
    fn begin_rejects_duplicate_product() {
        let mut status = CartStatus::default();
        let product = ProductId::new("p1");

        assert!(status.begin(&product));
        assert!(!status.begin(&product));
        assert!(status.is_pending_for(&product));

        status.finish(&product);

        assert!(!status.is_pending());
    }

    #[test]
    fn success_only_clears_matching_failure() {
        let mut status = CartStatus::default();
        let error = CartError::LineNotFound(LineId::now_v7());

        status.record_failure(OperationKind::RemoveItem, error.clone());
        status.record_success(OperationKind::AddItem);

        assert_eq!(
            status.last_error(),
            Some(&FailedOperation {
                kind: OperationKind::RemoveItem,
                error,
            })
        );

        status.record_success(OperationKind::RemoveItem);

        assert!(status.last_error().is_none());
    }
}
