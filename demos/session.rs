//! Session Example
//!
//! Replays a scripted shopper session against an in-memory catalog and store,
//! printing the cart after every step.
//!
//! Use `-f` to load a catalog fixture by name
//! Use `-s` to load a session script by name

use std::{io, sync::Arc};

use anyhow::Result;

use trolley::{
    fixtures::{Fixture, StepOutcome},
    observability,
    receipt::Receipt,
    session::CartSession,
    store::InMemoryCartStore,
    utils::SessionArgs,
};

/// Session Example
#[tokio::main]
#[expect(clippy::print_stdout, reason = "Example code")]
pub async fn main() -> Result<()> {
    let args = SessionArgs::load()?;

    observability::init(&args.log_level, args.log_format)?;

    let mut fixture = Fixture::new();
    fixture.load_catalog(&args.fixture)?.load_session(&args.script)?;

    let catalog = Arc::new(fixture.catalog());
    let store = Arc::new(InMemoryCartStore::new());

    let session = CartSession::restore(catalog.clone(), store.clone(), fixture.currency()?).await?;

    for (idx, step) in fixture.steps().iter().enumerate() {
        println!("\nStep {}: {step}", idx + 1);

        match step.apply(&session, &catalog).await? {
            StepOutcome::Applied(cart) => Receipt::from_cart(&cart)?.write_to(io::stdout())?,
            StepOutcome::Rejected(error) => println!("  rejected: {error}"),
            StepOutcome::CatalogChanged => println!("  catalog updated"),
        }
    }

    let status = session.aggregator().status();

    if let Some(failed) = status.last_error() {
        println!("\nLast error: {} ({})", failed.error, failed.kind);
    }

    println!("Saved lines: {}", store.records().len());

    Ok(())
}
