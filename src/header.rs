//! Metadata header parsing.
//!
//! A document may open with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: "Hello"
//! date: 2024-06-01
//! ---
//! Body markup starts here.
//! ```
//!
//! The block must be a YAML mapping. Values are read with `serde_yaml`;
//! the block's source text is kept as-is so it can be written back
//! byte for byte.

use serde_yaml::Value;

use crate::error::{Error, Result};

/// Opening and closing marker of the metadata block.
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

/// A single top-level key of the metadata block.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Entry {
    /// The value as text, for scalars. `None` for null, lists and maps.
    pub fn text(&self) -> Option<String> {
        scalar_text(&self.value)
    }
}

/// Ordered metadata parsed from a document header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    block: String,
    entries: Vec<Entry>,
}

impl DocumentMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Scalar value for `key` as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }

    pub fn title(&self) -> Option<String> {
        self.text("title")
    }

    pub fn date(&self) -> Option<String> {
        self.text("date")
    }

    /// Excerpt, empty when absent.
    pub fn excerpt(&self) -> String {
        self.text("excerpt").unwrap_or_default()
    }

    /// Entries in source order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Entries other than `title`, `date` and `excerpt`.
    pub fn extra(&self) -> impl Iterator<Item = &Entry> {
        self.entries()
            .filter(|entry| !matches!(entry.key.as_str(), "title" | "date" | "excerpt"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The metadata block exactly as read, delimiters and any leading
    /// byte order mark included. Empty when the document has no block.
    ///
    /// For text read by [`parse_header`], `to_header()` followed by the
    /// returned body is the text that was read.
    pub fn to_header(&self) -> &str {
        &self.block
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Split a raw document into its metadata and body.
///
/// Text that does not open with a `---` line has no header: metadata is
/// empty and the whole text is body. A block that is opened but never
/// closed, that is not valid YAML, or whose YAML is not a mapping is a
/// [`Error::MalformedHeader`]. Line numbers count from the opening
/// delimiter as line 1.
pub fn parse_header(raw: &str) -> Result<(DocumentMetadata, &str)> {
    let text = raw.strip_prefix(BOM).unwrap_or(raw);
    let bom_len = raw.len() - text.len();
    let no_header = DocumentMetadata {
        block: raw[..bom_len].to_string(),
        entries: Vec::new(),
    };

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((no_header, text));
    };
    if first.trim_end() != DELIMITER {
        return Ok((no_header, text));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut closing = None;
    for line in lines {
        if line.trim_end() == DELIMITER {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, block_end)) = closing else {
        return Err(Error::malformed(1, "metadata block is never closed"));
    };

    let entries = parse_entries(&text[yaml_start..yaml_end])?;
    let metadata = DocumentMetadata {
        block: raw[..bom_len + block_end].to_string(),
        entries,
    };
    Ok((metadata, &text[block_end..]))
}

fn parse_entries(yaml: &str) -> Result<Vec<Entry>> {
    let blank = yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(Vec::new());
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(|err| {
        let line = err.location().map(|loc| loc.line() + 1).unwrap_or(2);
        Error::malformed(line, err.to_string())
    })?;

    let mapping = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(Error::malformed(2, "metadata block is not a mapping")),
    };

    mapping
        .into_iter()
        .map(|(key, value)| match scalar_text(&key) {
            Some(key) if !key.is_empty() => Ok(Entry { key, value }),
            _ => Err(Error::malformed(2, "metadata keys must be non-empty scalars")),
        })
        .collect()
}
