//! Data types that flow through the ingestion and rendering pipeline.
//!
//! A [`RawDocument`] lives only for the duration of a single call. The
//! rendering layer consumes [`RenderedDocument`]s, either one at a time or
//! as an ordered [`Listing`].

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Unparsed document text read from the content root.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub identifier: String,
    pub path: PathBuf,
    pub text: String,
}

/// The record exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub identifier: String,
    pub title: String,
    /// Serialized as `YYYY-MM-DD`. `None` only for single lookups of a
    /// document without a `date`; listings never contain undated records.
    pub date: Option<NaiveDate>,
    pub excerpt: String,
    /// Empty only when body rendering was not requested.
    pub html_body: String,
    /// Header keys other than `title`, `date` and `excerpt`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RenderedDocument {
    /// Human-readable date, e.g. `June 1, 2024`.
    pub fn display_date(&self) -> Option<String> {
        self.date.map(|date| date.format("%B %-d, %Y").to_string())
    }
}

/// A document dropped from a listing, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub identifier: String,
    pub reason: String,
}

/// Documents ordered newest first, plus the documents that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub documents: Vec<RenderedDocument>,
    pub skipped: Vec<Skipped>,
}

impl Listing {
    pub fn get(&self, identifier: &str) -> Option<&RenderedDocument> {
        self.documents
            .iter()
            .find(|doc| doc.identifier == identifier)
    }
}

/// Order documents by date, newest first; equal dates by identifier.
/// Undated documents sort last.
pub fn sort_documents(documents: &mut [RenderedDocument]) {
    documents.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(identifier: &str, date: &str) -> RenderedDocument {
        RenderedDocument {
            identifier: identifier.to_string(),
            title: identifier.to_uppercase(),
            date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
            excerpt: String::new(),
            html_body: String::new(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut docs = vec![
            doc("a", "2024-01-01"),
            doc("c", "2023-12-31"),
            doc("b", "2024-06-01"),
        ];
        sort_documents(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_ties_by_identifier() {
        let mut docs = vec![
            doc("zeta", "2024-01-01"),
            doc("alpha", "2024-01-01"),
            doc("mid", "2024-01-01"),
        ];
        sort_documents(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(
            doc("a", "2024-06-01").display_date().as_deref(),
            Some("June 1, 2024")
        );
        assert_eq!(
            doc("a", "2023-12-25").display_date().as_deref(),
            Some("December 25, 2023")
        );

        let mut undated = doc("a", "2024-06-01");
        undated.date = None;
        assert_eq!(undated.display_date(), None);
    }

    #[test]
    fn test_serialize_record() {
        let mut record = doc("hello", "2024-01-05");
        record.html_body = "<p>hi</p>\n".to_string();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["identifier"], "hello");
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["html_body"], "<p>hi</p>\n");
        assert!(json.get("extra").is_none());

        record.extra.insert("author".to_string(), "Sam".into());
        record
            .extra
            .insert("tags".to_string(), serde_json::json!(["rust", "web"]));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["extra"]["author"], "Sam");
        assert_eq!(json["extra"]["tags"][1], "web");

        record.date = None;
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["date"].is_null());
    }
}
