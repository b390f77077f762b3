//! Plain-text report printed by the CLI.

use super::json::to_pretty_json;
use crate::error::Result;
use crate::models::{AthleteRecord, ScrapeOutcome};
use crate::stats::{aggregate, career_totals, render_table};

const MISSING: &str = "N/A";

/// Attribute block and season table for a found profile; the reason and
/// the JSON payload otherwise.
pub fn render_report(outcome: &ScrapeOutcome) -> Result<String> {
    match outcome {
        ScrapeOutcome::Found(found) => Ok(render_record(&found.record)),
        ScrapeOutcome::NotFound(missing) => Ok(format!(
            "Player not found: {}\n{}",
            missing.reason,
            to_pretty_json(outcome)?
        )),
    }
}

fn render_record(record: &AthleteRecord) -> String {
    let or_missing = |value: Option<&str>| value.unwrap_or(MISSING).to_string();
    let height = record
        .height_cm
        .map(|cm| format!("{cm} cm"))
        .unwrap_or_else(|| MISSING.to_string());

    let mut lines = vec![
        format!("Name: {}", or_missing(record.name.as_deref())),
        format!("Height: {height}"),
        format!("Position: {}", or_missing(record.position.as_deref())),
        format!("Class Year: {}", or_missing(record.class_year.as_deref())),
        format!("Hometown: {}", or_missing(record.hometown.as_deref())),
        format!("Profile: {}", record.url),
    ];
    if let Some(headshot) = &record.headshot_url {
        lines.push(format!("Headshot: {headshot}"));
    }
    if !record.accolades.is_empty() {
        lines.push(String::new());
        lines.push("Honors".to_string());
        lines.extend(record.accolades.iter().map(|a| format!("- {a}")));
    }

    lines.push(String::new());
    lines.push("Stats".to_string());
    lines.push(String::new());
    if record.stats_rows.is_empty() {
        lines.push("No statistics available.".to_string());
    } else {
        let seasons = aggregate(&record.stats_rows);
        lines.push("Career Statistics".to_string());
        lines.push(render_table(&seasons, &career_totals(&seasons)));
    }
    lines.join("\n")
}
