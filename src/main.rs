//! # Roster Scout
//!
//! Resolves a college athlete's public roster profile from a name and a
//! school, then extracts a structured record: biographical attributes,
//! season statistics and honors.
//!
//! ## Usage
//!
//! ```sh
//! roster_scout "Abdirasak Bulale" "St. Olaf College"
//! ```
//!
//! ## Architecture
//!
//! Each query is one sequential pipeline:
//! 1. **Domain**: map the school to its athletics hostname
//! 2. **Locate**: site search, then roster pages, then optional external search
//! 3. **Parse**: classify the page template and extract the record
//! 4. **Supplement**: fill missing statistics from team statistics pages
//! 5. **Output**: text report or JSON, optionally written to a file

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod domains;
mod error;
mod fetch;
mod locator;
mod matching;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod search;
mod stats;
mod team_stats;
mod utils;

use cli::Cli;
use config::ScraperConfig;
use outputs::{json, report};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("roster_scout starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.json_output, json = args.json, "Parsed CLI arguments");

    let config = ScraperConfig::load(args.config.as_deref()).await?;
    let query = args.query();

    let outcome = match pipeline::find_and_scrape(&query, &config, args.serpapi_key.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, name = %query.name, school = %query.school, "Query failed");
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", json::to_pretty_json(&outcome)?);
    } else {
        println!("{}", report::render_report(&outcome)?);
    }

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_outcome(&outcome, path).await {
            error!(path = %path, error = %e, "Failed to write JSON output");
            return Err(e.into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        found = outcome.is_found(),
        school_domain = %outcome.school_domain(),
        "Execution complete"
    );

    Ok(())
}
