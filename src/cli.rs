//! Command-line interface definitions for Roster Scout.
//!
//! Arguments can be given as flags; the search API key and config path also
//! fall back to environment variables.

use crate::models::{AthleteQuery, DEFAULT_SPORT_PATH};
use clap::Parser;

/// Find a college athlete's roster profile and print what it says.
///
/// # Examples
///
/// ```sh
/// # Basic lookup
/// roster_scout "Abdirasak Bulale" "St. Olaf College"
///
/// # Another sport, with the JSON outcome written to disk
/// roster_scout "Jane Doe" "Carleton College" --sport-path womens-soccer -j ./out/jane.json
///
/// # Enable the external search fallback
/// SERPAPI_KEY=... roster_scout "Abdirasak Bulale" "St. Olaf College"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Athlete name as it appears on the roster
    pub name: String,

    /// School name, e.g. "St. Olaf College"
    pub school: String,

    /// Sport section slug on the athletics site
    #[arg(long, default_value = DEFAULT_SPORT_PATH)]
    pub sport_path: String,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "ROSTER_SCOUT_CONFIG")]
    pub config: Option<String>,

    /// SerpApi key; enables the external search fallback
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    /// Print the JSON outcome instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON outcome to this file
    #[arg(short, long)]
    pub json_output: Option<String>,
}

impl Cli {
    pub fn query(&self) -> AthleteQuery {
        AthleteQuery::new(self.name.trim(), self.school.trim()).with_sport_path(self.sport_path.trim())
    }
}
