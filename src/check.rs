//! Content root health check.
//!
//! Lists documents that listings silently drop, with the reason each one
//! was dropped. Exits with status 1 when any document is skipped so the
//! command can gate a build.

use anyhow::Result;

use crate::config::Config;
use crate::store::DocumentStore;

pub async fn run_check(config: &Config) -> Result<()> {
    let store = DocumentStore::new(config)?;
    let listing = store.listing(true).await?;

    println!("Content root: {}", store.root().display());
    println!("  documents: {}", listing.documents.len());
    println!("  skipped:   {}", listing.skipped.len());

    if listing.skipped.is_empty() {
        println!("ok");
        return Ok(());
    }

    println!();
    println!("{:<28} REASON", "IDENTIFIER");
    for skipped in &listing.skipped {
        println!("{:<28} {}", skipped.identifier, skipped.reason);
    }
    std::process::exit(1);
}
