//! # Folio
//!
//! Content ingestion and rendering for a directory of Markdown documents
//! with metadata headers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │ Content root │──▶│  DocumentStore   │──▶│ RenderedDocument│
//! │  *.mdx *.md  │   │ scan/resolve/sort│   │  list / single  │
//! └──────────────┘   └────────┬─────────┘   └─────────────────┘
//!                             │ per document
//!                             ▼
//!                    ┌──────────────────┐
//!                    │ header → render  │
//!                    │ metadata + HTML  │
//!                    └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use folio::config::Config;
//! use folio::store::DocumentStore;
//!
//! # async fn run() -> folio::error::Result<()> {
//! let store = DocumentStore::new(&Config::for_root("src/content"))?;
//! for doc in store.list_all().await? {
//!     println!("{} {}", doc.display_date().unwrap_or_default(), doc.title);
//! }
//! let missing = store.get_by_identifier("missing").await?;
//! assert!(missing.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error taxonomy |
//! | [`header`] | Metadata block parsing and serialization |
//! | [`render`] | Markdown to HTML and record composition |
//! | [`store`] | Directory scanning, lookup and ordered listing |
//! | [`cache`] | Explicit listing cache |
//! | [`get`], [`list`], [`export`], [`check`] | CLI commands |

pub mod cache;
pub mod check;
pub mod config;
pub mod error;
pub mod export;
pub mod get;
pub mod header;
pub mod list;
pub mod models;
pub mod render;
pub mod store;
