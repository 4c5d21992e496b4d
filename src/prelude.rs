//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    aggregator::CartAggregator,
    cart::Cart,
    catalog::{CatalogError, CatalogProduct, CatalogSource, InMemoryCatalog, ResolvedProduct},
    errors::{CartError, SnapshotViolation},
    lines::{CartLine, CartLineRecord, LineId},
    pricing::{Price, TotalPriceError},
    products::{ProductDisplay, ProductId},
    receipt::{Receipt, ReceiptError},
    session::{CartSession, SessionError},
    status::{CartStatus, FailedOperation, OperationKind},
    store::{CartStore, InMemoryCartStore, StoreError},
};
