//! Per-season statistics and career totals.
//!
//! Raw [`StatsRow`]s are reduced to one [`SeasonStats`] per season label.
//! When a season appears twice (overall and conference splits on the same
//! page, or profile and team page) the row with more games played is kept.
//!
//! Numbers are parsed leniently: thousands separators are stripped and
//! anything unparseable counts as 0, so a partial table never aborts
//! aggregation.

use crate::models::StatsRow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Season label used for rows that carry none.
pub const UNKNOWN_SEASON: &str = "Unknown";

const TABLE_HEADER: [&str; 13] = [
    "Season", "GP", "GS", "G", "A", "PTS", "SH", "SH%", "SOG", "SOG%", "GW", "PK-ATT", "MIN",
];

/// Column keys a penalty-kick "made-attempted" cell may be filed under.
const PK_KEYS: [&str; 4] = ["pk-att", "pk-pa", "pg-pa", "pk"];

/// Penalty kicks as `made-attempted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PenaltyKicks {
    pub made: u32,
    pub attempted: u32,
}

impl PenaltyKicks {
    /// Parse `"2-3"`. Missing or malformed halves count as 0.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, '-');
        let made = parts.next().map(parse_count).unwrap_or_default();
        let attempted = parts.next().map(parse_count).unwrap_or_default();
        Self { made, attempted }
    }
}

impl std::ops::Add for PenaltyKicks {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            made: self.made.saturating_add(other.made),
            attempted: self.attempted.saturating_add(other.attempted),
        }
    }
}

impl fmt::Display for PenaltyKicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.made, self.attempted)
    }
}

/// One season, after deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStats {
    pub season: String,
    pub gp: u32,
    pub gs: u32,
    pub g: u32,
    pub a: u32,
    pub pts: u32,
    pub sh: u32,
    pub sog: u32,
    pub gw: u32,
    pub minutes: u32,
    pub sh_pct: String,
    pub sog_pct: String,
    pub pk_attempts: PenaltyKicks,
}

impl SeasonStats {
    pub fn from_row(row: &StatsRow) -> Self {
        let count = |key: &str| row.get(key).map(parse_count).unwrap_or_default();
        let (g, sh, sog) = (count("g"), count("sh"), count("sog"));
        let pct = |key: &str, numerator: u32| {
            row.get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| ratio_label(numerator, sh))
        };

        Self {
            season: row
                .season
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SEASON.to_string()),
            gp: count("gp"),
            gs: count("gs"),
            g,
            a: count("a"),
            pts: count("pts"),
            sh,
            sog,
            gw: count("gw"),
            minutes: count("min"),
            sh_pct: pct("sh%", g),
            sog_pct: pct("sog%", sog),
            pk_attempts: PK_KEYS
                .iter()
                .find_map(|key| row.get(key))
                .map(PenaltyKicks::parse)
                .unwrap_or_default(),
        }
    }
}

/// Career sums across retained seasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerTotals {
    pub gp: u32,
    pub gs: u32,
    pub g: u32,
    pub a: u32,
    pub pts: u32,
    pub sh: u32,
    pub sog: u32,
    pub gw: u32,
    pub minutes: u32,
    pub pk_attempts: PenaltyKicks,
    /// Goals per shot.
    pub sh_pct: String,
    /// Shots on goal per shot.
    pub sog_pct: String,
}

/// One entry per season label, sorted by label.
///
/// On a duplicate label the row with the larger `gp` wins; ties keep the
/// row seen first.
pub fn aggregate(rows: &[StatsRow]) -> Vec<SeasonStats> {
    let mut by_season: BTreeMap<String, SeasonStats> = BTreeMap::new();
    for stats in rows.iter().map(SeasonStats::from_row) {
        match by_season.get(&stats.season) {
            Some(kept) if kept.gp >= stats.gp => {}
            _ => {
                by_season.insert(stats.season.clone(), stats);
            }
        }
    }
    by_season.into_values().collect()
}

/// Sums saturate at `u32::MAX`.
pub fn career_totals(seasons: &[SeasonStats]) -> CareerTotals {
    let mut totals = seasons.iter().fold(CareerTotals::default(), |mut t, s| {
        t.gp = t.gp.saturating_add(s.gp);
        t.gs = t.gs.saturating_add(s.gs);
        t.g = t.g.saturating_add(s.g);
        t.a = t.a.saturating_add(s.a);
        t.pts = t.pts.saturating_add(s.pts);
        t.sh = t.sh.saturating_add(s.sh);
        t.sog = t.sog.saturating_add(s.sog);
        t.gw = t.gw.saturating_add(s.gw);
        t.minutes = t.minutes.saturating_add(s.minutes);
        t.pk_attempts = t.pk_attempts + s.pk_attempts;
        t
    });
    totals.sh_pct = ratio_label(totals.g, totals.sh);
    // Over all shots, not over shots on goal.
    totals.sog_pct = ratio_label(totals.sog, totals.sh);
    totals
}

/// Tab-separated season table with a trailing `Total` row.
pub fn render_table(seasons: &[SeasonStats], totals: &CareerTotals) -> String {
    let mut lines = vec![TABLE_HEADER.join("\t")];
    for s in seasons {
        lines.push(
            [
                s.season.clone(),
                s.gp.to_string(),
                s.gs.to_string(),
                s.g.to_string(),
                s.a.to_string(),
                s.pts.to_string(),
                s.sh.to_string(),
                s.sh_pct.clone(),
                s.sog.to_string(),
                s.sog_pct.clone(),
                s.gw.to_string(),
                s.pk_attempts.to_string(),
                s.minutes.to_string(),
            ]
            .join("\t"),
        );
    }
    lines.push(
        [
            "Total".to_string(),
            totals.gp.to_string(),
            totals.gs.to_string(),
            totals.g.to_string(),
            totals.a.to_string(),
            totals.pts.to_string(),
            totals.sh.to_string(),
            totals.sh_pct.clone(),
            totals.sog.to_string(),
            totals.sog_pct.clone(),
            totals.gw.to_string(),
            totals.pk_attempts.to_string(),
            totals.minutes.to_string(),
        ]
        .join("\t"),
    );
    lines.join("\n")
}

/// Lenient non-negative integer: commas stripped, anything else is 0.
fn parse_count(raw: &str) -> u32 {
    raw.trim().replace(',', "").parse().unwrap_or(0)
}

/// `numerator / denominator` to three places, `"0.000"` on a zero denominator.
fn ratio_label(numerator: u32, denominator: u32) -> String {
    if denominator == 0 {
        return "0.000".to_string();
    }
    format!("{:.3}", f64::from(numerator) / f64::from(denominator))
}
