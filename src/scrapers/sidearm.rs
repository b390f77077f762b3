//! SIDEARM Sports profile parser.
//!
//! SIDEARM is the most common athletics-site template and the only one parsed
//! in full. Markup differs between SIDEARM generations (the classic
//! `sidearm-roster-*` classes and the newer `c-player-bio` components), so
//! every field is looked up through several fallbacks instead of one fixed
//! path.

use super::{element_text, elements_after, parse_height_cm, selector, text_tables, H1, OG_TITLE};
use crate::matching::{best_match, header_key};
use crate::models::{AthleteRecord, Provider, StatsRow, StatsSource};
use crate::utils::normalize_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

static PLAYER_NAME: Lazy<Selector> = Lazy::new(|| selector(".sidearm-roster-player-name"));
static FIRST_NAME: Lazy<Selector> =
    Lazy::new(|| selector(".sidearm-roster-player-first-name"));
static LAST_NAME: Lazy<Selector> = Lazy::new(|| selector(".sidearm-roster-player-last-name"));
static TWITTER_TITLE: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[name="twitter:title"]"#));
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| selector(r#"script[type="application/ld+json"]"#));
static BREADCRUMB_ITEMS: Lazy<Selector> = Lazy::new(|| {
    selector(r#"nav[aria-label*="breadcrumb"] li, .breadcrumb li, .breadcrumbs li"#)
});
static ATTRIBUTE_ITEMS: Lazy<Selector> = Lazy::new(|| {
    selector(
        ".sidearm-roster-player-attributes li, .c-roster-bio__info li, \
         .sidearm-roster__player-details li, .c-player-bio__list li",
    )
});
static POSITION_CLASS: Lazy<Selector> = Lazy::new(|| selector(r#"[class*="position"]"#));
static HEADSHOT_REGIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".sidearm-roster-player img",
        ".c-player-bio img",
        "figure img",
        ".c-player-header img",
        r#"img[alt*="headshot" i]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});
static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static SUBHEADINGS: Lazy<Selector> = Lazy::new(|| selector("h2, h3, h4"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

const POSITION_LABELS: [&str; 4] = ["Position", "Pos.", "POS", "Position(s)"];
const CLASS_LABELS: [&str; 3] = ["Class", "Year", "Academic Year"];
const HOMETOWN_LABELS: [&str; 1] = ["Hometown"];
const ACCOLADE_HEADINGS: [&str; 4] = ["honors", "awards", "bio", "personal"];
const ACCOLADE_KEYWORDS: [&str; 6] = [
    "all-",
    "honor",
    "award",
    "miac",
    "player of the",
    "team of the week",
];

/// Extract a full record from a SIDEARM profile document.
pub fn parse(document: &Html, page_url: &Url, query_name: &str) -> AthleteRecord {
    let name = resolve_name(document, query_name);

    let attribute_text = document.select(&ATTRIBUTE_ITEMS).map(|li| element_text(&li)).join(" ");
    let height_cm = parse_height_cm(&attribute_text).or_else(|| {
        document
            .select(&BODY)
            .next()
            .and_then(|body| parse_height_cm(&element_text(&body)))
    });

    let position = labeled_value(document, &POSITION_LABELS).or_else(|| {
        document
            .select(&POSITION_CLASS)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    });
    let class_year = labeled_value(document, &CLASS_LABELS);
    let hometown = labeled_value(document, &HOMETOWN_LABELS);
    let headshot_url = headshot(document, page_url);
    let stats_rows = stats_table(document);
    let accolades = accolades(document);

    debug!(
        name = ?name,
        height_cm = ?height_cm,
        stats_rows = stats_rows.len(),
        accolades = accolades.len(),
        "Parsed SIDEARM profile"
    );

    AthleteRecord {
        url: page_url.to_string(),
        provider: Provider::Sidearm,
        name,
        height_cm,
        position,
        class_year,
        hometown,
        headshot_url,
        stats_rows,
        accolades,
        stats_source: None,
    }
}

/// The athlete's display name.
///
/// The dedicated player-name region wins when present. Otherwise every
/// name-bearing fragment on the page competes via [`best_match`], and the
/// first non-empty fragment is the fallback.
fn resolve_name(document: &Html, query_name: &str) -> Option<String> {
    if let Some(region) = document.select(&PLAYER_NAME).next() {
        let first = region.select(&FIRST_NAME).next().map(|el| element_text(&el));
        let last = region.select(&LAST_NAME).next().map(|el| element_text(&el));
        let joined = match (first, last) {
            (Some(first), Some(last)) => normalize_whitespace(&format!("{first} {last}")),
            _ => String::new(),
        };
        let name = if joined.is_empty() {
            element_text(&region)
        } else {
            joined
        };
        if !name.is_empty() {
            return Some(name);
        }
    }

    let candidates = name_candidates(document);
    let matched = best_match(query_name, &candidates).map(str::to_string);
    matched.or_else(|| candidates.into_iter().find(|c| !c.is_empty()))
}

fn name_candidates(document: &Html) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(h1) = document.select(&H1).next() {
        candidates.push(element_text(&h1));
    }
    for meta in [&*OG_TITLE, &*TWITTER_TITLE] {
        if let Some(content) = document
            .select(meta)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            let head = content.split(" - ").next().unwrap_or_default();
            candidates.push(normalize_whitespace(head));
        }
    }
    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            collect_person_names(&value, &mut candidates);
        }
    }
    if let Some(last) = document.select(&BREADCRUMB_ITEMS).last() {
        candidates.push(element_text(&last));
    }
    candidates.retain(|c| !c.is_empty());
    candidates
}

/// Names of `Person`/`Athlete` entities in a JSON-LD value, including
/// top-level arrays and `@graph` lists.
fn collect_person_names(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_person_names(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            let is_person = match map.get("@type") {
                Some(serde_json::Value::String(kind)) => is_person_type(kind),
                Some(serde_json::Value::Array(kinds)) => kinds
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .any(is_person_type),
                _ => false,
            };
            if is_person {
                if let Some(name) = map.get("name").and_then(serde_json::Value::as_str) {
                    out.push(normalize_whitespace(name));
                }
            }
            if let Some(graph) = map.get("@graph") {
                collect_person_names(graph, out);
            }
        }
        _ => {}
    }
}

fn is_person_type(kind: &str) -> bool {
    kind == "Person" || kind == "Athlete"
}

/// Value printed after the first occurrence of any of `labels`.
///
/// Finds the first text node containing the label as a whole word
/// (case-insensitive, ignoring script and style text) and returns the text
/// of the next element in document order. Labels are tried in order; a label
/// whose value is empty does not stop the search.
fn labeled_value(document: &Html, labels: &[&str]) -> Option<String> {
    for label in labels {
        let trailing = if label.ends_with(|c: char| c.is_alphanumeric()) {
            r"\b"
        } else {
            ""
        };
        let Ok(pattern) = Regex::new(&format!(r"(?i)\b{}{trailing}", regex::escape(label)))
        else {
            continue;
        };

        let mut nodes = document.tree.root().descendants();
        while let Some(node) = nodes.next() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let in_code = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            if in_code || !pattern.is_match(text) {
                continue;
            }
            let value = nodes
                .find_map(ElementRef::wrap)
                .map(|el| element_text(&el))
                .filter(|v| !v.is_empty());
            if value.is_some() {
                return value;
            }
            break;
        }
    }
    None
}

/// Headshot URL from the highest-priority region that has an image.
fn headshot(document: &Html, page_url: &Url) -> Option<String> {
    HEADSHOT_REGIONS.iter().find_map(|region| {
        document.select(region).find_map(|img| {
            let src = image_source(&img)?;
            Some(
                page_url
                    .join(src)
                    .map(String::from)
                    .unwrap_or_else(|_| src.to_string()),
            )
        })
    })
}

/// `src`, else `data-src`, else the first URL of `srcset`.
fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    let attr = |name| {
        img.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    attr("src").or_else(|| attr("data-src")).or_else(|| {
        attr("srcset")?
            .split(',')
            .next()?
            .split_whitespace()
            .next()
    })
}

/// Rows of the first statistics table that yields any data.
fn stats_table(document: &Html) -> Vec<StatsRow> {
    for table in text_tables(document) {
        if !table.is_stats_table() {
            continue;
        }
        let keys: Vec<String> = table.headers.iter().map(|h| header_key(h)).collect();
        let rows: Vec<StatsRow> = table
            .rows
            .into_iter()
            .filter_map(|cells| {
                let fields: BTreeMap<String, String> =
                    keys.iter().cloned().zip(cells).collect();
                let season = fields
                    .get("season")
                    .or_else(|| fields.get("year"))
                    .filter(|s| !s.is_empty())
                    .cloned();
                let has_data = fields
                    .values()
                    .any(|v| !v.is_empty() && Some(v) != season.as_ref());
                has_data.then_some(StatsRow {
                    season,
                    source: StatsSource::Profile,
                    fields,
                })
            })
            .collect();
        if !rows.is_empty() {
            return rows;
        }
    }
    Vec::new()
}

/// Honors listed under an awards-style heading, else award-like paragraphs.
fn accolades(document: &Html) -> Vec<String> {
    let mut found = Vec::new();
    for word in ACCOLADE_HEADINGS {
        let Some(heading) = document
            .select(&SUBHEADINGS)
            .find(|h| element_text(h).to_lowercase().contains(word))
        else {
            continue;
        };
        if let Some(list) = elements_after(document, heading).find(|el| el.value().name() == "ul") {
            found.extend(
                list.select(&LIST_ITEM)
                    .map(|li| element_text(&li))
                    .filter(|t| !t.is_empty()),
            );
        }
    }
    if !found.is_empty() {
        return found.into_iter().unique().collect();
    }

    document
        .select(&PARAGRAPH)
        .map(|p| element_text(&p))
        .filter(|text| {
            let low = text.to_lowercase();
            ACCOLADE_KEYWORDS.iter().any(|k| low.contains(k))
        })
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_URL: &str =
        "https://athletics.stolaf.edu/sports/mens-soccer/roster/abdirasak-bulale/8123";

    const CLASSIC_PROFILE: &str = r#"
<html>
<head>
  <title>Abdirasak Bulale - Men's Soccer - St. Olaf College Athletics</title>
  <meta property="og:title" content="Abdirasak Bulale - Men's Soccer - St. Olaf College Athletics">
  <link rel="stylesheet" href="/sidearm.sites.css">
</head>
<body>
  <div class="sidearm-roster-player">
    <img src="/images/2024/8/20/Bulale_Abdirasak.jpg" alt="Abdirasak Bulale">
    <h2 class="sidearm-roster-player-name">
      <span class="sidearm-roster-player-jersey-number">7</span>
      <span class="sidearm-roster-player-first-name">Abdirasak</span>
      <span class="sidearm-roster-player-last-name">Bulale</span>
    </h2>
    <ul class="sidearm-roster-player-attributes">
      <li><span>Position</span><span>Forward</span></li>
      <li><span>Height</span><span>5-11</span></li>
      <li><span>Class</span><span>Sophomore</span></li>
    </ul>
    <div class="sidearm-roster-player-hometown">
      <span>Hometown</span> <span>Minneapolis, Minn.</span>
    </div>
  </div>
  <table>
    <thead><tr><th>Name</th><th>Position</th><th>Year</th></tr></thead>
    <tbody><tr><td>Abdirasak Bulale</td><td>F</td><td>So.</td></tr></tbody>
  </table>
  <table>
    <thead><tr><th>Season</th><th>GP</th><th>GS</th><th>G</th><th>A</th><th>PTS</th></tr></thead>
    <tbody>
      <tr><td>2023</td><td>14</td><td>10</td><td>3</td><td>1</td><td>7</td></tr>
      <tr><td>2024</td><td></td><td></td><td></td><td></td><td></td></tr>
    </tbody>
  </table>
  <table>
    <thead><tr><th>Season</th><th>GP</th><th>G</th></tr></thead>
    <tbody><tr><td>2022</td><td>9</td><td>1</td></tr></tbody>
  </table>
  <h3>Honors</h3>
  <ul>
    <li>All-MIAC Honorable Mention (2023)</li>
    <li>MIAC Rookie of the Week (Sept. 12, 2023)</li>
    <li>All-MIAC Honorable Mention (2023)</li>
  </ul>
</body>
</html>"#;

    const MODERN_PROFILE: &str = r#"
<html>
<head>
  <meta name="twitter:title" content="Abdi Bulale - St. Olaf">
  <script type="application/ld+json">
    {"@context": "https://schema.org", "@graph": [
      {"@type": "Organization", "name": "St. Olaf College Athletics"},
      {"@type": ["Person", "Athlete"], "name": "Abdirasak  Bulale"}
    ]}
  </script>
  <script>var sidearmConfig = {"Position": "ignored"};</script>
</head>
<body>
  <h1>St. Olaf College Athletics</h1>
  <nav aria-label="breadcrumb"><ol><li>Home</li><li>Roster</li><li>Abdi Bulale</li></ol></nav>
  <div class="c-player-header">
    <picture><img data-src="https://cdn.example.com/headshots/bulale.jpg" alt="headshot"></picture>
  </div>
  <ul class="c-player-bio__list">
    <li><span>Ht.</span> <span>6' 2''</span></li>
  </ul>
  <span class="c-player-position">Midfielder</span>
  <p>Named to the All-MIAC Second Team as a junior.</p>
  <p>Majoring in economics.</p>
</body>
</html>"#;

    fn parse_str(html: &str) -> AthleteRecord {
        let document = Html::parse_document(html);
        parse(&document, &Url::parse(PROFILE_URL).unwrap(), "Abdirasak Bulale")
    }

    #[test]
    fn test_classic_profile_fields() {
        let record = parse_str(CLASSIC_PROFILE);
        assert_eq!(record.provider, Provider::Sidearm);
        assert_eq!(record.name.as_deref(), Some("Abdirasak Bulale"));
        assert_eq!(record.height_cm, Some(180));
        assert_eq!(record.position.as_deref(), Some("Forward"));
        assert_eq!(record.class_year.as_deref(), Some("Sophomore"));
        assert_eq!(record.hometown.as_deref(), Some("Minneapolis, Minn."));
        assert_eq!(
            record.headshot_url.as_deref(),
            Some("https://athletics.stolaf.edu/images/2024/8/20/Bulale_Abdirasak.jpg")
        );
        assert_eq!(record.url, PROFILE_URL);
    }

    #[test]
    fn test_classic_profile_takes_first_stats_table_only() {
        let record = parse_str(CLASSIC_PROFILE);
        assert_eq!(record.stats_rows.len(), 1);
        let row = &record.stats_rows[0];
        assert_eq!(row.season.as_deref(), Some("2023"));
        assert_eq!(row.source, StatsSource::Profile);
        assert_eq!(row.get("gp"), Some("14"));
        assert_eq!(row.get("pts"), Some("7"));
    }

    #[test]
    fn test_classic_profile_accolades_deduplicated() {
        let record = parse_str(CLASSIC_PROFILE);
        assert_eq!(
            record.accolades,
            vec![
                "All-MIAC Honorable Mention (2023)",
                "MIAC Rookie of the Week (Sept. 12, 2023)",
            ]
        );
    }

    #[test]
    fn test_modern_profile_name_from_candidates() {
        let record = parse_str(MODERN_PROFILE);
        assert_eq!(record.name.as_deref(), Some("Abdirasak Bulale"));
    }

    #[test]
    fn test_modern_profile_attributes() {
        let record = parse_str(MODERN_PROFILE);
        assert_eq!(record.height_cm, Some(188));
        assert_eq!(record.position.as_deref(), Some("Midfielder"));
        assert_eq!(record.class_year, None);
        assert_eq!(
            record.headshot_url.as_deref(),
            Some("https://cdn.example.com/headshots/bulale.jpg")
        );
        assert!(record.stats_rows.is_empty());
    }

    #[test]
    fn test_modern_profile_paragraph_accolades() {
        let record = parse_str(MODERN_PROFILE);
        assert_eq!(
            record.accolades,
            vec!["Named to the All-MIAC Second Team as a junior."]
        );
    }

    #[test]
    fn test_name_falls_back_to_first_candidate() {
        let record = parse_str(
            "<html><body><h1>Men's Soccer Roster</h1><p>sidearm</p></body></html>",
        );
        assert_eq!(record.name.as_deref(), Some("Men's Soccer Roster"));
    }

    #[test]
    fn test_name_region_without_parts_uses_region_text() {
        let record = parse_str(
            r#"<html><body><h2 class="sidearm-roster-player-name"> Abdirasak
               Bulale </h2></body></html>"#,
        );
        assert_eq!(record.name.as_deref(), Some("Abdirasak Bulale"));
    }

    #[test]
    fn test_srcset_headshot() {
        let record = parse_str(
            r#"<html><body><figure><img srcset="/img/a-320.jpg 320w, /img/a-640.jpg 640w"></figure></body></html>"#,
        );
        assert_eq!(
            record.headshot_url.as_deref(),
            Some("https://athletics.stolaf.edu/img/a-320.jpg")
        );
    }

    #[test]
    fn test_height_falls_back_to_page_text() {
        let record = parse_str(r#"<html><body><div>Ht: 6 ft 2 in</div></body></html>"#);
        assert_eq!(record.height_cm, Some(188));
    }

    #[test]
    fn test_labeled_value_skips_empty_values() {
        let document = Html::parse_document(
            "<div><span>Class</span><br><span>Senior</span></div><dl><dt>Year</dt><dd>Junior</dd></dl>",
        );
        assert_eq!(labeled_value(&document, &CLASS_LABELS).as_deref(), Some("Junior"));
    }

    #[test]
    fn test_json_ld_person_array() {
        let value: serde_json::Value = serde_json::from_str(
            r#"[{"@type": "Person", "name": "A B"}, {"@type": "Event", "name": "Game"}]"#,
        )
        .unwrap();
        let mut out = Vec::new();
        collect_person_names(&value, &mut out);
        assert_eq!(out, vec!["A B"]);
    }
}
