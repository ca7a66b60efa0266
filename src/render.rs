//! Markdown to HTML conversion and record composition.
//!
//! [`render_body`] never fails. Constructs it cannot represent faithfully
//! are rendered best-effort and reported as [`Degradation`]s:
//!
//! | Construct | Handling |
//! |-----------|----------|
//! | MDX `import`/`export` lines | dropped from the output |
//! | JSX component tags (`<Callout>`) | passed through as raw HTML |
//! | `[text][label]` with no definition | rendered as plain text |

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{html, BrokenLink, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::fmt;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::header::parse_header;
use crate::models::{RawDocument, RenderedDocument};

/// A markup construct that was rendered best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// MDX module statement, stripped. `line` is 1-based within the body.
    EsmStatement { line: usize },
    /// JSX component with no HTML equivalent.
    ComponentTag { name: String },
    /// Reference-style link whose label has no definition.
    UnresolvedReference { label: String },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EsmStatement { line } => write!(f, "module statement dropped at body line {}", line),
            Self::ComponentTag { name } => write!(f, "component <{}> passed through as raw HTML", name),
            Self::UnresolvedReference { label } => {
                write!(f, "link reference [{}] has no definition", label)
            }
        }
    }
}

/// Output of [`render_body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub degradations: Vec<Degradation>,
}

pub fn markdown_options(config: &RenderConfig) -> Options {
    let mut options = Options::empty();
    if config.tables {
        options.insert(Options::ENABLE_TABLES);
    }
    if config.footnotes {
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if config.strikethrough {
        options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if config.tasklists {
        options.insert(Options::ENABLE_TASKLISTS);
    }
    if config.smart_punctuation {
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    options
}

/// Convert body markup to an HTML fragment.
///
/// Pure: identical `body` and `config` always yield identical output.
pub fn render_body(body: &str, config: &RenderConfig) -> Rendered {
    let mut degradations = Vec::new();
    let source = strip_module_statements(body, &mut degradations);

    let mut unresolved: Vec<String> = Vec::new();
    let mut events = Vec::new();
    {
        let mut on_broken_link = |link: BrokenLink| {
            if matches!(link.link_type, LinkType::Reference | LinkType::Collapsed) {
                unresolved.push(link.reference.to_string());
            }
            None::<(CowStr, CowStr)>
        };
        let parser = Parser::new_with_broken_link_callback(
            &source,
            markdown_options(config),
            Some(&mut on_broken_link),
        );

        let mut in_external_link = false;
        for event in parser {
            match event {
                Event::Html(ref raw) | Event::InlineHtml(ref raw) => {
                    record_component_tags(raw, &mut degradations);
                    events.push(event);
                }
                Event::Start(Tag::Link {
                    ref dest_url,
                    ref title,
                    ..
                }) if config.external_links_new_tab && is_external(dest_url) => {
                    let open = external_link_open(dest_url, title);
                    in_external_link = true;
                    events.push(Event::InlineHtml(open.into()));
                }
                Event::End(TagEnd::Link) if in_external_link => {
                    in_external_link = false;
                    events.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                }
                other => events.push(other),
            }
        }
    }

    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, events.into_iter());

    for label in unresolved {
        let degradation = Degradation::UnresolvedReference { label };
        if !degradations.contains(&degradation) {
            degradations.push(degradation);
        }
    }

    Rendered {
        html: out,
        degradations,
    }
}

/// Parse, validate and render one document.
///
/// With `with_body` unset the body is not converted and `html_body` is
/// left empty. A document without a `date` gets `date: None`; a `date`
/// that is present but unparseable is an [`Error::InvalidDate`].
pub fn render_document(
    raw: &RawDocument,
    config: &RenderConfig,
    with_body: bool,
) -> Result<RenderedDocument> {
    let (metadata, body) = parse_header(&raw.text)?;

    let date = match metadata.date() {
        Some(value) => Some(parse_date(&value).ok_or(Error::InvalidDate { value })?),
        None => {
            debug!(identifier = %raw.identifier, "document has no date");
            None
        }
    };

    if metadata.title().is_none() {
        debug!(identifier = %raw.identifier, "document has no title");
    }

    let html_body = if with_body {
        let rendered = render_body(body, config);
        for degradation in &rendered.degradations {
            warn!(
                identifier = %raw.identifier,
                path = %raw.path.display(),
                "{}",
                degradation
            );
        }
        rendered.html
    } else {
        String::new()
    };

    Ok(RenderedDocument {
        identifier: raw.identifier.clone(),
        title: metadata.title().unwrap_or_default(),
        date,
        excerpt: metadata.excerpt(),
        html_body,
        extra: metadata
            .extra()
            .map(|entry| (entry.key.clone(), json_value(&entry.value)))
            .collect(),
    })
}

fn json_value(value: &serde_yaml::Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| {
        serde_json::Value::String(serde_yaml::to_string(value).unwrap_or_default())
    })
}

/// Parse a calendar date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and
/// `YYYY-MM-DD HH:MM[:SS]`; the time part is discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Remove top-level MDX `import`/`export` lines. Lines inside fenced code
/// are left alone, and removed lines keep their line ending so later line
/// numbers stay put.
fn strip_module_statements(body: &str, degradations: &mut Vec<Degradation>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut fence: Option<(char, usize)> = None;
    let mut paragraph_start = true;

    for (idx, line) in body.split_inclusive('\n').enumerate() {
        let content = line.trim_end_matches(['\n', '\r']);

        if let Some(marker) = fence_marker(content) {
            fence = match fence {
                None => Some(marker),
                Some(open) if marker.0 == open.0 && marker.1 >= open.1 => None,
                still_open => still_open,
            };
            out.push_str(line);
            paragraph_start = false;
            continue;
        }

        if fence.is_none() && paragraph_start && is_module_statement(content) {
            degradations.push(Degradation::EsmStatement { line: idx + 1 });
            out.push_str(&line[content.len()..]);
            continue;
        }

        out.push_str(line);
        paragraph_start = fence.is_none() && content.trim().is_empty();
    }

    out
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let count = rest.chars().take_while(|c| *c == marker).count();
    (count >= 3).then_some((marker, count))
}

fn is_module_statement(line: &str) -> bool {
    let line = line.trim_end();
    if let Some(rest) = line.strip_prefix("import ") {
        let rest = rest.trim_end_matches(';');
        return rest.starts_with(['"', '\''])
            || (rest.contains(" from ") && rest.ends_with(['"', '\'']));
    }
    if let Some(rest) = line.strip_prefix("export ") {
        return ["const ", "let ", "var ", "function ", "default ", "async ", "{", "* "]
            .iter()
            .any(|prefix| rest.starts_with(prefix));
    }
    false
}

fn record_component_tags(raw: &str, degradations: &mut Vec<Degradation>) {
    let mut rest = raw;
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos + 1..];
        let tag = rest.strip_prefix('/').unwrap_or(rest);
        if !tag.starts_with(|c: char| c.is_ascii_uppercase()) {
            continue;
        }
        let name: String = tag
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
            .collect();
        if is_html_element(&name) {
            continue;
        }
        let degradation = Degradation::ComponentTag { name };
        if !degradations.contains(&degradation) {
            degradations.push(degradation);
        }
    }
}

/// HTML element names, matched case-insensitively.
const HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "center", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "font", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input",
    "ins", "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter",
    "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture",
    "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "section", "select",
    "slot", "small", "source", "span", "strong", "style", "sub", "summary", "sup", "svg", "table",
    "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track",
    "u", "ul", "var", "video", "wbr",
];

fn is_html_element(name: &str) -> bool {
    HTML_ELEMENTS
        .iter()
        .any(|element| element.eq_ignore_ascii_case(name))
}

fn is_external(dest: &str) -> bool {
    dest.starts_with("http://") || dest.starts_with("https://")
}

fn external_link_open(dest: &str, title: &str) -> String {
    let mut tag = String::from("<a href=\"");
    escape_attr(&mut tag, dest);
    tag.push('"');
    if !title.is_empty() {
        tag.push_str(" title=\"");
        escape_attr(&mut tag, title);
        tag.push('"');
    }
    tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
    tag
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
