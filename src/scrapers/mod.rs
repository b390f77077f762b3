//! Profile page parsers, one per page-generation template.
//!
//! A fetched profile is classified by [`Provider::classify`] and dispatched
//! to the matching parser:
//!
//! | Provider | Module | Extraction |
//! |----------|--------|------------|
//! | SIDEARM Sports | [`sidearm`] | Full record: name, height, attributes, headshot, stats, accolades |
//! | PrestoSports | [`generic`] | Name only |
//! | anything else | [`generic`] | Name only |
//!
//! Supporting a new template means adding a module and one match arm in
//! [`parse_profile`].
//!
//! The helpers at the bottom of this module (text extraction, document-order
//! traversal, table reading, height parsing) are shared by the parsers and by
//! the team statistics lookup.

pub mod generic;
pub mod sidearm;

use crate::fetch::Page;
use crate::matching::looks_like_stats_header;
use crate::models::{AthleteRecord, Provider};
use crate::utils::normalize_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

pub(crate) static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
pub(crate) static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
pub(crate) static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static THEAD_TH: Lazy<Selector> = Lazy::new(|| selector("thead th"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| selector("th"));
static BODY_ROW: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static DATA_CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

static HEIGHT_DASHED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<f>\d)\s*[-'’]\s*(?P<i>\d{1,2})").expect("static regex"));
static HEIGHT_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<f>\d)\s*ft\.?\s*(?P<i>\d{1,2})?\s*in\.?\b").expect("static regex")
});
static HEIGHT_FEET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<f>\d)\s*['’](?:\s*(?P<i>\d{1,2})\b)?").expect("static regex")
});

/// Parse a selector known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

impl Provider {
    /// Identify the template from signature markers in the raw body.
    ///
    /// Case-insensitive substring check; the first marker found wins.
    pub fn classify(body: &str) -> Provider {
        let low = body.to_lowercase();
        if low.contains("sidearm") {
            Provider::Sidearm
        } else if low.contains("prestosports") || low.contains("presto") {
            Provider::Presto
        } else {
            Provider::Unknown
        }
    }
}

/// Classify a fetched profile page and extract its record.
#[instrument(level = "info", skip_all, fields(url = %page.url))]
pub fn parse_profile(page: &Page, query_name: &str) -> AthleteRecord {
    let provider = Provider::classify(&page.body);
    let document = Html::parse_document(&page.body);
    debug!(%provider, "Classified profile template");
    match provider {
        Provider::Sidearm => sidearm::parse(&document, &page.url, query_name),
        Provider::Presto | Provider::Unknown => {
            generic::parse(&document, &page.url, provider, query_name)
        }
    }
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Every element after `anchor` in document order, its descendants included.
pub(crate) fn elements_after<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let id = anchor.id();
    document
        .tree
        .root()
        .descendants()
        .skip_while(move |node| node.id() != id)
        .skip(1)
        .filter_map(ElementRef::wrap)
}

/// A table reduced to header texts and body row cell texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    /// At least three header cells that pass [`looks_like_stats_header`].
    pub fn is_stats_table(&self) -> bool {
        self.headers.len() >= 3 && looks_like_stats_header(&self.headers)
    }
}

/// Every table in document order.
///
/// Headers come from `thead th`, else from the `th` cells of the first row.
/// Rows are the `tbody` rows that carry at least one `td`.
pub(crate) fn text_tables(document: &Html) -> Vec<TextTable> {
    document.select(&TABLE).map(|table| read_table(&table)).collect()
}

fn read_table(table: &ElementRef) -> TextTable {
    let mut headers: Vec<String> = table.select(&THEAD_TH).map(|th| element_text(&th)).collect();
    if headers.is_empty() {
        headers = table
            .select(&ROW)
            .next()
            .map(|row| row.select(&HEADER_CELL).map(|th| element_text(&th)).collect())
            .unwrap_or_default();
    }
    let rows = table
        .select(&BODY_ROW)
        .map(|tr| tr.select(&DATA_CELL).map(|td| element_text(&td)).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    TextTable { headers, rows }
}

/// Find a feet-inches height in free text and convert it to centimeters.
///
/// Accepts `6-2`, `6'2`, `6 ft 2 in` and a bare `6'`; inches default to 0.
/// Matches with more than 11 inches are skipped so that season labels such
/// as `2024-25` are not read as heights.
pub fn parse_height_cm(text: &str) -> Option<u32> {
    [&*HEIGHT_DASHED, &*HEIGHT_WORDS, &*HEIGHT_FEET]
        .into_iter()
        .find_map(|pattern| {
            pattern.captures_iter(text).find_map(|caps| {
                let feet: u32 = caps.name("f")?.as_str().parse().ok()?;
                let inches: u32 = match caps.name("i") {
                    Some(m) => m.as_str().parse().ok()?,
                    None => 0,
                };
                (inches < 12).then(|| (f64::from(feet * 12 + inches) * 2.54).round() as u32)
            })
        })
}
