//! `folio ids` and `folio list`.

use anyhow::Result;

use crate::config::Config;
use crate::store::DocumentStore;

/// Print every identifier, one per line. This is the list static-path
/// generation pre-renders.
pub fn run_ids(config: &Config) -> Result<()> {
    let store = DocumentStore::new(config)?;
    for identifier in store.list_identifiers()? {
        println!("{}", identifier);
    }
    Ok(())
}

/// Print the ordered listing as a table or as JSON.
pub async fn run_list(config: &Config, json: bool, with_bodies: bool) -> Result<()> {
    let store = DocumentStore::new(config)?;
    let listing = store.listing(with_bodies).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing.documents)?);
        return Ok(());
    }

    if listing.documents.is_empty() {
        println!("No documents in {}", store.root().display());
        return Ok(());
    }

    println!("{:<12} {:<28} TITLE", "DATE", "IDENTIFIER");
    for doc in &listing.documents {
        println!(
            "{:<12} {:<28} {}",
            doc.date.map(|date| date.to_string()).unwrap_or_default(),
            doc.identifier,
            doc.title
        );
    }
    if !listing.skipped.is_empty() {
        println!();
        println!(
            "{} document(s) skipped; run `folio check` for details.",
            listing.skipped.len()
        );
    }

    Ok(())
}
