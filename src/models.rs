//! Data models for queries, profile candidates and extracted athlete records.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`AthleteQuery`]: The immutable (name, school, sport) input
//! - [`ProfileCandidate`]: A scored profile URL produced by the locator
//! - [`AthleteRecord`]: The structured record extracted from a profile page
//! - [`StatsRow`]: One raw statistics row, from the profile or a team page
//! - [`ScrapeOutcome`]: The JSON-serializable result of a whole query
//!
//! Serialized field names are camelCase to match the published output shape.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Sport section used when none is given.
pub const DEFAULT_SPORT_PATH: &str = "mens-soccer";

/// The query a user asks about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteQuery {
    /// Display name as typed, never normalized.
    pub name: String,
    /// School display name as typed.
    pub school: String,
    /// Slug of the sport section on the athletics site (e.g. `mens-soccer`).
    pub sport_path: String,
}

impl AthleteQuery {
    pub fn new(name: impl Into<String>, school: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            school: school.into(),
            sport_path: DEFAULT_SPORT_PATH.to_string(),
        }
    }

    pub fn with_sport_path(mut self, sport_path: impl Into<String>) -> Self {
        self.sport_path = sport_path.into();
        self
    }
}

/// How a profile candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMethod {
    SiteSearch,
    RosterScan,
    ExternalSearch,
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceMethod::SiteSearch => "site-search",
            SourceMethod::RosterScan => "roster-scan",
            SourceMethod::ExternalSearch => "external-search",
        })
    }
}

/// A scored profile URL. Ranked and discarded once the best one is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCandidate {
    pub url: url::Url,
    /// 0..=100 for fuzzy methods; the small integer scale for external search.
    pub match_score: u8,
    pub source_method: SourceMethod,
}

/// Page-generation template a document was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Sidearm,
    Presto,
    Unknown,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Sidearm => "sidearm",
            Provider::Presto => "presto",
            Provider::Unknown => "unknown",
        })
    }
}

/// Where a statistics row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    Profile,
    TeamStatsPage,
}

/// One raw statistics row.
///
/// `fields` maps canonical header keys (lower-case, no trailing dots) to the
/// cell text as it appeared on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    pub season: Option<String>,
    pub source: StatsSource,
    pub fields: BTreeMap<String, String>,
}

impl StatsRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// The structured record extracted from a profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteRecord {
    /// Final URL of the profile page, after redirects.
    pub url: String,
    pub provider: Provider,
    /// Resolved display name; may differ from the query name.
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hometown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headshot_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stats_rows: Vec<StatsRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accolades: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_source: Option<StatsSource>,
}

impl AthleteRecord {
    /// A record carrying only what the degraded path can recover.
    pub fn name_only(url: String, provider: Provider, name: Option<String>) -> Self {
        Self {
            url,
            provider,
            name,
            height_cm: None,
            position: None,
            class_year: None,
            hometown: None,
            headshot_url: None,
            stats_rows: Vec::new(),
            accolades: Vec::new(),
            stats_source: None,
        }
    }

    /// Replace an empty statistics section with rows found elsewhere.
    ///
    /// A record that already has rows, or an empty replacement, is returned
    /// untouched.
    pub fn with_supplemented_stats(mut self, rows: Vec<StatsRow>) -> Self {
        if self.stats_rows.is_empty() && !rows.is_empty() {
            self.stats_rows = rows;
            self.stats_source = Some(StatsSource::TeamStatsPage);
        }
        self
    }
}

/// Result of a whole query, shaped for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutcome {
    Found(FoundProfile),
    NotFound(MissingProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundProfile {
    pub found: bool,
    #[serde(flatten)]
    pub record: AthleteRecord,
    pub input: AthleteQuery,
    pub school_domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingProfile {
    pub found: bool,
    pub reason: String,
    pub school_domain: String,
    pub input: AthleteQuery,
}

/// Reason reported when no profile URL could be resolved.
pub const PROFILE_NOT_FOUND: &str = "profile_not_found";

impl ScrapeOutcome {
    pub fn found(record: AthleteRecord, input: AthleteQuery, school_domain: String) -> Self {
        ScrapeOutcome::Found(FoundProfile {
            found: true,
            record,
            input,
            school_domain,
        })
    }

    pub fn not_found(input: AthleteQuery, school_domain: String) -> Self {
        ScrapeOutcome::NotFound(MissingProfile {
            found: false,
            reason: PROFILE_NOT_FOUND.to_string(),
            school_domain,
            input,
        })
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ScrapeOutcome::Found(_))
    }

    pub fn school_domain(&self) -> &str {
        match self {
            ScrapeOutcome::Found(found) => &found.school_domain,
            ScrapeOutcome::NotFound(missing) => &missing.school_domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(season: &str) -> StatsRow {
        StatsRow {
            season: Some(season.to_string()),
            source: StatsSource::TeamStatsPage,
            fields: BTreeMap::from([("gp".to_string(), "14".to_string())]),
        }
    }

    #[test]
    fn test_query_defaults_to_mens_soccer() {
        let query = AthleteQuery::new("Abdirasak Bulale", "St. Olaf College");
        assert_eq!(query.sport_path, "mens-soccer");
        let query = query.with_sport_path("womens-soccer");
        assert_eq!(query.sport_path, "womens-soccer");
    }

    #[test]
    fn test_supplemented_stats_only_fill_empty_rows() {
        let record = AthleteRecord::name_only(
            "https://athletics.stolaf.edu/sports/mens-soccer/roster/x/1".to_string(),
            Provider::Sidearm,
            Some("Abdirasak Bulale".to_string()),
        );
        let filled = record.with_supplemented_stats(vec![sample_row("2024")]);
        assert_eq!(filled.stats_rows.len(), 1);
        assert_eq!(filled.stats_source, Some(StatsSource::TeamStatsPage));

        let again = filled.clone().with_supplemented_stats(vec![sample_row("2023"), sample_row("2022")]);
        assert_eq!(again, filled);
    }

    #[test]
    fn test_found_outcome_serialization() {
        let record = AthleteRecord {
            height_cm: Some(188),
            ..AthleteRecord::name_only(
                "https://athletics.stolaf.edu/sports/mens-soccer/roster/x/1".to_string(),
                Provider::Sidearm,
                Some("Abdirasak Bulale".to_string()),
            )
        };
        let outcome = ScrapeOutcome::found(
            record,
            AthleteQuery::new("Abdirasak Bulale", "St. Olaf College"),
            "athletics.stolaf.edu".to_string(),
        );

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["provider"], "sidearm");
        assert_eq!(json["heightCm"], 188);
        assert_eq!(json["schoolDomain"], "athletics.stolaf.edu");
        assert_eq!(json["input"]["sportPath"], "mens-soccer");
        assert!(json.get("statsSource").is_none());
        assert!(json.get("statsRows").is_none());
        assert!(json.get("accolades").is_none());
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_not_found_outcome_serialization() {
        let outcome = ScrapeOutcome::not_found(
            AthleteQuery::new("Nobody Here", "Nowhere College"),
            "athletics.nowhere.edu".to_string(),
        );
        assert!(!outcome.is_found());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["reason"], "profile_not_found");
        assert_eq!(json["schoolDomain"], "athletics.nowhere.edu");
        assert_eq!(json["input"]["name"], "Nobody Here");
    }

    #[test]
    fn test_stats_source_serializes_snake_case() {
        let json = serde_json::to_string(&StatsSource::TeamStatsPage).unwrap();
        assert_eq!(json, "\"team_stats_page\"");
        assert_eq!(SourceMethod::RosterScan.to_string(), "roster-scan");
    }
}
