//! Degraded parser for templates that are not parsed in full.
//!
//! Only the athlete's name is recovered, by matching the page heading and
//! title metadata against the query name.

use super::{element_text, H1, OG_TITLE, TITLE};
use crate::matching::best_match;
use crate::models::{AthleteRecord, Provider};
use crate::utils::normalize_whitespace;
use scraper::Html;
use tracing::debug;
use url::Url;

pub fn parse(document: &Html, page_url: &Url, provider: Provider, query_name: &str) -> AthleteRecord {
    let heading = document
        .select(&H1)
        .next()
        .or_else(|| document.select(&TITLE).next())
        .map(|el| element_text(&el));
    let og_title = document
        .select(&OG_TITLE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(normalize_whitespace);

    let candidates: Vec<String> = [heading, og_title]
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .collect();
    let matched = best_match(query_name, &candidates).map(str::to_string);
    let name = matched.or_else(|| candidates.into_iter().next());

    debug!(%provider, name = ?name, "Parsed profile through name-only path");
    AthleteRecord::name_only(page_url.to_string(), provider, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(html: &str) -> AthleteRecord {
        let document = Html::parse_document(html);
        let url = Url::parse("https://gobulldogs.example.com/roster.aspx?rp_id=77").unwrap();
        parse(&document, &url, Provider::Presto, "Abdirasak Bulale")
    }

    #[test]
    fn test_prefers_matching_og_title() {
        let record = parse_str(
            r#"<html><head><meta property="og:title" content="Abdirasak Bulale"></head>
               <body><h1>Men's Soccer</h1></body></html>"#,
        );
        assert_eq!(record.name.as_deref(), Some("Abdirasak Bulale"));
        assert_eq!(record.provider, Provider::Presto);
        assert!(record.stats_rows.is_empty());
        assert_eq!(record.height_cm, None);
    }

    #[test]
    fn test_title_used_when_no_heading() {
        let record = parse_str(
            "<html><head><title>Abdirasak Bulale  Bio</title></head><body></body></html>",
        );
        assert_eq!(record.name.as_deref(), Some("Abdirasak Bulale Bio"));
    }

    #[test]
    fn test_unmatched_name_falls_back_to_first_candidate() {
        let record = parse_str("<html><body><h1>Team Roster</h1></body></html>");
        assert_eq!(record.name.as_deref(), Some("Team Roster"));
    }

    #[test]
    fn test_no_name_sources() {
        let record = parse_str("<html><body><p>nothing here</p></body></html>");
        assert_eq!(record.name, None);
        assert_eq!(record.url, "https://gobulldogs.example.com/roster.aspx?rp_id=77");
    }
}
