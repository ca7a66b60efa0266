//! Export the listing as JSON for the page-rendering layer.
//!
//! Produces a single document with the ordered records and the skipped
//! diagnostics:
//!
//! ```json
//! { "documents": [ { "identifier": "...", ... } ], "skipped": [] }
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::store::DocumentStore;

/// Export the listing as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>, with_bodies: bool) -> Result<()> {
    let store = DocumentStore::new(config)?;
    let listing = store.listing(with_bodies).await?;
    let json = serde_json::to_string_pretty(&listing)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} documents ({} skipped) to {}",
                listing.documents.len(),
                listing.skipped.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
