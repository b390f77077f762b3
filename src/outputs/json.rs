//! JSON output of a query outcome.
//!
//! The payload shape is the one [`ScrapeOutcome`] serializes to: the full
//! record plus `found`, `input` and `schoolDomain` on success, or
//! `{found: false, reason, schoolDomain, input}` on failure.

use crate::error::{Result, ScrapeError};
use crate::models::ScrapeOutcome;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Pretty-printed JSON for stdout.
pub fn to_pretty_json(outcome: &ScrapeOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Write the outcome to `path`, creating parent directories as needed.
#[instrument(level = "info", skip(outcome))]
pub async fn write_outcome(outcome: &ScrapeOutcome, path: &str) -> Result<()> {
    let json = to_pretty_json(outcome)?;
    let io_error = |source| ScrapeError::Output {
        path: path.to_string(),
        source,
    };

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(parent = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(io_error(e));
        }
    }

    info!(path, "Writing JSON");
    fs::write(path, json).await.map_err(io_error)?;
    info!(path, found = outcome.is_found(), "Wrote outcome JSON");
    Ok(())
}
