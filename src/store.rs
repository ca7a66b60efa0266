//! Document store over a content root directory.
//!
//! The store holds no documents. Every call rescans the content root and
//! rebuilds its results, so concurrent callers never share state. Use
//! [`CachedStore`](crate::cache::CachedStore) to reuse results explicitly.
//!
//! Failures are split in two:
//!
//! - per-document problems (missing file, malformed header, bad date,
//!   invalid UTF-8) make the document absent from results and are logged.
//!   A document with no date at all is still returned by
//!   [`DocumentStore::get_by_identifier`] but left out of listings;
//! - environment problems (permissions, I/O errors) are returned as
//!   [`Error::FileSystem`].

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Config, RenderConfig};
use crate::error::{Error, Result};
use crate::models::{sort_documents, Listing, RawDocument, RenderedDocument, Skipped};
use crate::render::render_document;

/// A document file discovered under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub identifier: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    extensions: Vec<String>,
    excludes: GlobSet,
    follow_symlinks: bool,
    render: RenderConfig,
}

impl DocumentStore {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.content.exclude_globs {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::Config(format!("invalid exclude glob '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        let excludes = builder
            .build()
            .map_err(|e| Error::Config(format!("invalid exclude globs: {}", e)))?;

        Ok(Self {
            root: config.content.root.clone(),
            extensions: config.content.extensions.clone(),
            excludes,
            follow_symlinks: config.content.follow_symlinks,
            render: config.render.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifiers of every document under the content root, sorted.
    ///
    /// A missing content root is an empty store, not an error.
    pub fn list_identifiers(&self) -> Result<Vec<String>> {
        Ok(self
            .scan()?
            .into_iter()
            .map(|file| file.identifier)
            .collect())
    }

    /// Document files under the content root, sorted by identifier.
    pub fn scan(&self) -> Result<Vec<DocumentFile>> {
        if !self.root_exists()? {
            debug!(root = %self.root.display(), "content root does not exist");
            return Ok(Vec::new());
        }

        // identifier -> (extension rank, path)
        let mut found: BTreeMap<String, (usize, PathBuf)> = BTreeMap::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                Error::file_system(path, err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "skipping non UTF-8 file name");
                continue;
            };
            if name.starts_with('.') || self.excludes.is_match(name) {
                continue;
            }
            let Some((identifier, rank)) = self.split_name(name) else {
                continue;
            };

            let replace = match found.get(identifier) {
                Some((existing_rank, existing)) => {
                    let replace = rank < *existing_rank;
                    let (kept, ignored) = if replace {
                        (path, existing.as_path())
                    } else {
                        (existing.as_path(), path)
                    };
                    warn!(
                        identifier,
                        kept = %kept.display(),
                        ignored = %ignored.display(),
                        "duplicate document identifier"
                    );
                    replace
                }
                None => true,
            };
            if replace {
                found.insert(identifier.to_string(), (rank, path.to_path_buf()));
            }
        }

        Ok(found
            .into_iter()
            .map(|(identifier, (_, path))| DocumentFile { identifier, path })
            .collect())
    }

    /// Resolve and render a single document.
    ///
    /// Returns `Ok(None)` when the identifier names no document or the
    /// document cannot be parsed; the two cases are not distinguished.
    /// Every identifier from [`list_identifiers`](Self::list_identifiers)
    /// whose header parses resolves here, dated or not.
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<Option<RenderedDocument>> {
        if !is_plain_identifier(identifier) {
            debug!(identifier, "rejecting identifier that is not a file stem");
            return Ok(None);
        }

        let Some(path) = self.resolve(identifier).await? else {
            debug!(identifier, "document not found");
            return Ok(None);
        };

        match load_document(identifier.to_string(), path, &self.render, true).await {
            Ok(doc) => Ok(Some(doc)),
            Err(err) if err.is_recoverable() => {
                warn!(identifier, error = %err, "document unavailable");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every parseable document, newest first, bodies rendered.
    pub async fn list_all(&self) -> Result<Vec<RenderedDocument>> {
        Ok(self.listing(true).await?.documents)
    }

    /// Every parseable, dated document, newest first, plus the documents
    /// that were dropped and why.
    ///
    /// Documents are read and rendered concurrently; the listing is
    /// assembled once every document has finished. Must be called from
    /// within a tokio runtime.
    pub async fn listing(&self, with_bodies: bool) -> Result<Listing> {
        let files = self.scan()?;

        let mut tasks = JoinSet::new();
        for file in files {
            let render = self.render.clone();
            tasks.spawn(async move {
                let result =
                    load_document(file.identifier.clone(), file.path, &render, with_bodies)
                        .await
                        .and_then(require_date);
                (file.identifier, result)
            });
        }

        let mut listing = Listing::default();
        while let Some(joined) = tasks.join_next().await {
            let (identifier, result) = joined?;
            match result {
                Ok(doc) => listing.documents.push(doc),
                Err(err) if err.is_recoverable() => {
                    warn!(identifier = %identifier, error = %err, "skipping document");
                    listing.skipped.push(Skipped {
                        identifier,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        sort_documents(&mut listing.documents);
        listing
            .skipped
            .sort_by(|a, b| a.identifier.cmp(&b.identifier));

        info!(
            root = %self.root.display(),
            documents = listing.documents.len(),
            skipped = listing.skipped.len(),
            "listing assembled"
        );
        Ok(listing)
    }

    fn root_exists(&self) -> Result<bool> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(Error::file_system(
                &self.root,
                std::io::Error::other("content root is not a directory"),
            )),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::file_system(&self.root, err)),
        }
    }

    /// Split `name.ext` into identifier and the extension's rank.
    fn split_name<'a>(&self, name: &'a str) -> Option<(&'a str, usize)> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        let rank = self.extensions.iter().position(|e| e == ext)?;
        Some((stem, rank))
    }

    async fn resolve(&self, identifier: &str) -> Result<Option<PathBuf>> {
        for ext in &self.extensions {
            let name = format!("{}.{}", identifier, ext);
            if self.excludes.is_match(&name) {
                continue;
            }
            let path = self.root.join(&name);
            let meta = if self.follow_symlinks {
                tokio::fs::metadata(&path).await
            } else {
                tokio::fs::symlink_metadata(&path).await
            };
            match meta {
                Ok(meta) if meta.is_file() => return Ok(Some(path)),
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(Error::file_system(path, err)),
            }
        }
        Ok(None)
    }
}

async fn load_document(
    identifier: String,
    path: PathBuf,
    render: &RenderConfig,
    with_body: bool,
) -> Result<RenderedDocument> {
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(Error::NotFound(identifier)),
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            return Err(Error::InvalidEncoding { path })
        }
        Err(err) => return Err(Error::file_system(path, err)),
    };

    let raw = RawDocument {
        identifier,
        path,
        text,
    };
    render_document(&raw, render, with_body)
}

/// Listings order by date, so undated documents are left out.
fn require_date(doc: RenderedDocument) -> Result<RenderedDocument> {
    match doc.date {
        Some(_) => Ok(doc),
        None => Err(Error::MissingDate),
    }
}

/// A single, non-empty path component other than `.` or `..`.
fn is_plain_identifier(identifier: &str) -> bool {
    if identifier.is_empty() || identifier.starts_with('.') {
        return false;
    }
    let mut components = Path::new(identifier).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == identifier
    )
}
