//! Trolley
//!
//! Trolley is the cart aggregation engine behind a mobile storefront: it keeps the lines a shopper has added, their snapshotted prices and a total that always matches them.

pub mod aggregator;
pub mod cart;
pub mod catalog;
pub mod errors;
pub mod fixtures;
pub mod lines;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
pub mod status;
pub mod store;
pub mod utils;
pub mod uuids;
