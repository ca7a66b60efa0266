//! Document retrieval by identifier.
//!
//! Backs the `folio get` command. An absent document prints an error and
//! exits with status 1; environment failures propagate as errors.

use anyhow::Result;

use crate::config::Config;
use crate::store::DocumentStore;

/// CLI entry point: resolve one document and print it to stdout.
pub async fn run_get(config: &Config, identifier: &str, json: bool) -> Result<()> {
    let store = DocumentStore::new(config)?;

    let doc = match store.get_by_identifier(identifier).await? {
        Some(doc) => doc,
        None => {
            eprintln!("Error: document not found: {}", identifier);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("--- Document ---");
    println!("identifier:   {}", doc.identifier);
    println!(
        "title:        {}",
        if doc.title.is_empty() {
            "(untitled)"
        } else {
            doc.title.as_str()
        }
    );
    match (doc.date, doc.display_date()) {
        (Some(date), Some(display)) => println!("date:         {} ({})", date, display),
        _ => println!("date:         (undated)"),
    }
    if !doc.excerpt.is_empty() {
        println!("excerpt:      {}", doc.excerpt);
    }
    for (key, value) in &doc.extra {
        match value {
            serde_json::Value::String(text) => println!("{:<13} {}", format!("{}:", key), text),
            other => println!("{:<13} {}", format!("{}:", key), other),
        }
    }
    println!();

    println!("--- HTML ---");
    println!("{}", doc.html_body);

    Ok(())
}
