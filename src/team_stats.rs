//! Team statistics pages as a second source of season rows.
//!
//! Used only when the profile itself carried no statistics. The dated
//! `/sports/<sport>/stats/<year>` pages are tried for the three most recent
//! seasons, newest first; the undated page is the fallback when none of them
//! had the athlete.

use crate::fetch::{join_url, Page, PageSource};
use crate::matching::{header_key, row_matches_name};
use crate::models::{StatsRow, StatsSource};
use crate::scrapers::text_tables;
use crate::utils::SeasonCalendar;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Seasons looked up on dated team pages.
pub const SEASONS_TO_CHECK: usize = 3;

/// Find the athlete's row on the team statistics pages.
///
/// At most one row per page is kept. Every row is tagged
/// [`StatsSource::TeamStatsPage`].
#[instrument(level = "info", skip(pages, origin, calendar), fields(%origin))]
pub async fn supplement<P: PageSource>(
    pages: &P,
    origin: &Url,
    sport_path: &str,
    name: &str,
    calendar: SeasonCalendar,
) -> Vec<StatsRow> {
    let rows: Vec<StatsRow> = stream::iter(calendar.recent_years(SEASONS_TO_CHECK))
        .then(|year| async move {
            let url = stats_url(origin, &format!("/sports/{sport_path}/stats/{year}"))?;
            let page = fetch(pages, &url).await?;
            find_athlete_row(&page, name, &year)
        })
        .filter_map(|row| async move { row })
        .collect()
        .await;

    if !rows.is_empty() {
        info!(count = rows.len(), "Found rows on dated team stats pages");
        return rows;
    }

    let latest = calendar.latest.to_string();
    let Some(url) = stats_url(origin, &format!("/sports/{sport_path}/stats")) else {
        return Vec::new();
    };
    let row = match fetch(pages, &url).await {
        Some(page) => find_athlete_row(&page, name, &latest),
        None => None,
    };
    if row.is_some() {
        info!(season = %latest, "Found row on undated team stats page");
    }
    row.into_iter().collect()
}

fn stats_url(origin: &Url, path: &str) -> Option<Url> {
    join_url(origin, path)
        .inspect_err(|e| warn!(error = %e, "Skipping unbuildable stats URL"))
        .ok()
}

async fn fetch<P: PageSource>(pages: &P, url: &Url) -> Option<Page> {
    match pages.get_page(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            debug!(%url, error = %e, "Team stats page unavailable");
            None
        }
    }
}

/// First row in a statistics table that belongs to `name`.
///
/// A row needs at least three cells and no fewer cells than the header.
pub fn find_athlete_row(page: &Page, name: &str, season: &str) -> Option<StatsRow> {
    let document = Html::parse_document(&page.body);
    text_tables(&document)
        .into_iter()
        .filter(|table| table.is_stats_table())
        .find_map(|table| {
            let cells = table.rows.iter().find(|cells| {
                cells.len() >= 3
                    && cells.len() >= table.headers.len()
                    && row_matches_name(name, &cells.join(" "))
            })?;
            let fields: BTreeMap<String, String> = table
                .headers
                .iter()
                .map(|h| header_key(h))
                .zip(cells.iter().cloned())
                .collect();
            debug!(%season, url = %page.url, "Matched team stats row");
            Some(StatsRow {
                season: Some(season.to_string()),
                source: StatsSource::TeamStatsPage,
                fields,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticPages;
    use chrono::NaiveDate;

    const ORIGIN: &str = "https://athletics.stolaf.edu/";
    const STATS: &str = "https://athletics.stolaf.edu/sports/mens-soccer/stats";

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::for_date(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
    }

    fn stats_page(rows: &[&[&str]]) -> String {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        format!(
            "<html><body>
               <table><thead><tr><th>Opponent</th><th>Result</th></tr></thead>
                 <tbody><tr><td>Carleton</td><td>W 2-1</td></tr></tbody></table>
               <table><thead><tr><th>#</th><th>Player</th><th>GP</th><th>G</th><th>A</th></tr></thead>
                 <tbody>{body}</tbody></table>
             </body></html>"
        )
    }

    async fn run(pages: &StaticPages) -> Vec<StatsRow> {
        supplement(
            pages,
            &Url::parse(ORIGIN).unwrap(),
            "mens-soccer",
            "Abdirasak Bulale",
            calendar(),
        )
        .await
    }

    #[tokio::test]
    async fn test_one_row_per_dated_season() {
        let pages = StaticPages::new()
            .with(
                &format!("{STATS}/2025"),
                &stats_page(&[
                    &["7", "Bulale, Abdirasak", "14", "5", "2"],
                    &["7", "Abdirasak Bulale", "1", "1", "1"],
                ]),
            )
            .with(
                &format!("{STATS}/2023"),
                &stats_page(&[&["9", "Abdirasak Bulale", "10", "3", "1"]]),
            );

        let rows = run(&pages).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].season.as_deref(), Some("2025"));
        assert_eq!(rows[0].get("gp"), Some("14"));
        assert_eq!(rows[0].get("player"), Some("Bulale, Abdirasak"));
        assert_eq!(rows[1].season.as_deref(), Some("2023"));
        assert!(rows.iter().all(|r| r.source == StatsSource::TeamStatsPage));
        assert!(!pages.requested().contains(&STATS.to_string()));
    }

    #[tokio::test]
    async fn test_falls_back_to_undated_page() {
        let pages = StaticPages::new().with(
            STATS,
            &stats_page(&[&["7", "Abdirasak Bulale", "14", "5", "2"]]),
        );

        let rows = run(&pages).await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].season.as_deref(), Some("2025"));
        assert_eq!(
            pages.requested(),
            vec![
                format!("{STATS}/2025"),
                format!("{STATS}/2024"),
                format!("{STATS}/2023"),
                STATS.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_anywhere() {
        let pages = StaticPages::new().with(
            STATS,
            &stats_page(&[&["3", "Someone Else", "14", "5", "2"]]),
        );
        assert!(run(&pages).await.is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let page = Page {
            url: Url::parse(STATS).unwrap(),
            body: stats_page(&[
                &["Abdirasak Bulale", "14"],
                &["7", "Abdirasak Bulale", "14", "5", "2"],
            ]),
        };
        let row = find_athlete_row(&page, "Abdirasak Bulale", "2024").unwrap();
        assert_eq!(row.get("#"), Some("7"));
        assert_eq!(row.get("a"), Some("2"));
    }

    #[test]
    fn test_non_stats_tables_are_ignored() {
        let page = Page {
            url: Url::parse(STATS).unwrap(),
            body: "<table><thead><tr><th>Name</th><th>Position</th><th>Year</th></tr></thead>
                   <tbody><tr><td>Abdirasak Bulale</td><td>F</td><td>So.</td></tr></tbody></table>"
                .to_string(),
        };
        assert_eq!(find_athlete_row(&page, "Abdirasak Bulale", "2024"), None);
    }
}
