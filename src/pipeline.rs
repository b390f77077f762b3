//! One query from (name, school) to a [`ScrapeOutcome`].
//!
//! ```text
//! school ─► DomainTable ─► Site
//! name ───► ProfileLocator ─► profile URL ─► fetch ─► parse_profile
//!                                                        │ SIDEARM, no stats rows?
//!                                                        ▼
//!                                              team_stats::supplement
//! ```
//!
//! [`find_and_scrape`] owns the HTTP client for the whole query; it is
//! dropped when the function returns, however it returns.

use crate::config::ScraperConfig;
use crate::domains::{DomainTable, ResolvedDomain};
use crate::error::{Result, ScrapeError};
use crate::fetch::{HttpFetcher, PageSource, RetryFetch};
use crate::locator::ProfileLocator;
use crate::models::{AthleteQuery, Provider, ScrapeOutcome};
use crate::scrapers::parse_profile;
use crate::search::{ExternalLocator, SerpApiSearch};
use crate::team_stats;
use crate::utils::SeasonCalendar;
use tracing::{info, instrument, warn};
use url::Url;

/// The athletics site a query runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Hostname reported as `schoolDomain` and used to scope external search.
    pub hostname: String,
    /// Root URL every site path is joined onto.
    pub origin: Url,
}

impl Site {
    pub fn from_hostname(hostname: &str) -> Result<Self> {
        let origin = Url::parse(&format!("https://{hostname}/")).map_err(|source| {
            ScrapeError::InvalidHost {
                host: hostname.to_string(),
                source,
            }
        })?;
        Ok(Self {
            hostname: hostname.to_string(),
            origin,
        })
    }
}

/// Resolve the school through the built-in table and any configured extras.
pub fn resolve_domain(config: &ScraperConfig, school: &str) -> ResolvedDomain {
    DomainTable::with_extras(&config.schools).resolve(school)
}

/// Run a whole query over HTTP.
///
/// `serpapi_key` enables the external search fallback; without it that
/// attempt is a no-op.
#[instrument(level = "info", skip_all, fields(name = %query.name, school = %query.school))]
pub async fn find_and_scrape(
    query: &AthleteQuery,
    config: &ScraperConfig,
    serpapi_key: Option<&str>,
) -> Result<ScrapeOutcome> {
    let domain = resolve_domain(config, &query.school);
    info!(
        school_key = %domain.school_key,
        host = %domain.hostname,
        origin = ?domain.origin,
        "Resolved athletics site"
    );
    let site = Site::from_hostname(&domain.hostname)?;

    let client = HttpFetcher::build_client(config).map_err(ScrapeError::Client)?;
    let external = SerpApiSearch::from_key(
        client.clone(),
        serpapi_key,
        &query.sport_path,
        &config.sport_hint_for(&query.sport_path),
    );
    let fetcher = RetryFetch::from_config(HttpFetcher::new(client), config);

    scrape_profile(query, &site, &fetcher, &external, SeasonCalendar::current()).await
}

/// Locate, fetch, parse and, when needed, supplement one profile.
///
/// Only SIDEARM records are supplemented; degraded records stay name-only.
/// An unresolved profile is an `Ok` not-found outcome. A profile that was
/// resolved but cannot be fetched is an error.
pub async fn scrape_profile<P: PageSource, E: ExternalLocator>(
    query: &AthleteQuery,
    site: &Site,
    pages: &P,
    external: &E,
    calendar: SeasonCalendar,
) -> Result<ScrapeOutcome> {
    let locator = ProfileLocator::new(pages, external, site.origin.clone(), &query.sport_path)
        .with_calendar(calendar);
    let Some(candidate) = locator.locate(&query.name).await else {
        return Ok(ScrapeOutcome::not_found(query.clone(), site.hostname.clone()));
    };

    let page = pages
        .get_page(&candidate.url)
        .await
        .map_err(ScrapeError::ProfileFetch)?;
    let mut record = parse_profile(&page, &query.name);

    if record.provider == Provider::Sidearm && record.stats_rows.is_empty() {
        let rows = team_stats::supplement(
            pages,
            &site.origin,
            &query.sport_path,
            &query.name,
            calendar,
        )
        .await;
        if rows.is_empty() {
            warn!("No statistics on the profile or the team pages");
        }
        record = record.with_supplemented_stats(rows);
    }

    Ok(ScrapeOutcome::found(record, query.clone(), site.hostname.clone()))
}
