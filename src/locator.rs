//! Turning a name into a profile URL on one athletics site.
//!
//! Three attempts run strictly in order and the first one that produces a
//! candidate wins:
//!
//! 1. [`SourceMethod::SiteSearch`]: the site's own `/search?query=` page.
//! 2. [`SourceMethod::RosterScan`]: the sport's roster pages, current season
//!    first, then two prior seasons, then the alternate list view.
//! 3. [`SourceMethod::ExternalSearch`]: the injected [`ExternalLocator`].
//!
//! Fetch failures only ever cost the page they happened on.

use crate::fetch::{join_url, Page, PageSource};
use crate::matching::{
    fuzzy_score, partial_score, ROSTER_LINK_THRESHOLD, SITE_SEARCH_THRESHOLD,
};
use crate::models::{ProfileCandidate, SourceMethod};
use crate::scrapers::{element_text, selector};
use crate::search::ExternalLocator;
use crate::utils::SeasonCalendar;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// Attempts in priority order.
pub const ATTEMPT_ORDER: [SourceMethod; 3] = [
    SourceMethod::SiteSearch,
    SourceMethod::RosterScan,
    SourceMethod::ExternalSearch,
];

/// Locator bound to one site origin and sport section.
pub struct ProfileLocator<'a, P, E> {
    pages: &'a P,
    external: &'a E,
    origin: Url,
    sport_path: String,
    calendar: SeasonCalendar,
}

impl<'a, P: PageSource, E: ExternalLocator> ProfileLocator<'a, P, E> {
    /// `origin` is the site root, e.g. `https://athletics.stolaf.edu/`.
    pub fn new(pages: &'a P, external: &'a E, origin: Url, sport_path: impl Into<String>) -> Self {
        Self {
            pages,
            external,
            origin,
            sport_path: sport_path.into(),
            calendar: SeasonCalendar::current(),
        }
    }

    pub fn with_calendar(mut self, calendar: SeasonCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Run the attempts in [`ATTEMPT_ORDER`] and return the first candidate.
    #[instrument(level = "info", skip(self), fields(origin = %self.origin))]
    pub async fn locate(&self, name: &str) -> Option<ProfileCandidate> {
        for method in ATTEMPT_ORDER {
            let candidate = match method {
                SourceMethod::SiteSearch => self.site_search(name).await,
                SourceMethod::RosterScan => self.roster_scan(name).await,
                SourceMethod::ExternalSearch => self.external_search(name).await,
            };
            match candidate {
                Some(candidate) => {
                    info!(
                        url = %candidate.url,
                        score = candidate.match_score,
                        method = %candidate.source_method,
                        "Resolved profile URL"
                    );
                    return Some(candidate);
                }
                None => debug!(%method, "No candidate from attempt"),
            }
        }
        info!("Profile URL not found");
        None
    }

    /// `<origin>/search?query=<name>`, first sport roster link whose text
    /// closely contains the name.
    async fn site_search(&self, name: &str) -> Option<ProfileCandidate> {
        let url = self.site_url(&format!("/search?query={}", urlencoding::encode(name)))?;
        let page = self.fetch(&url).await?;
        let document = Html::parse_document(&page.body);

        document
            .select(&LINK)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let relevant = is_roster_link(href) && href.contains(self.sport_path.as_str());
                relevant.then(|| (href, element_text(&a)))
            })
            .find_map(|(href, text)| {
                let score = partial_score(name, &text);
                if score < SITE_SEARCH_THRESHOLD {
                    return None;
                }
                let url = page.url.join(href).ok()?;
                Some(ProfileCandidate {
                    url,
                    match_score: score,
                    source_method: SourceMethod::SiteSearch,
                })
            })
    }

    /// Walk [`Self::roster_urls`], stopping at the first page with a match.
    async fn roster_scan(&self, name: &str) -> Option<ProfileCandidate> {
        for url in self.roster_urls() {
            let Some(page) = self.fetch(&url).await else {
                continue;
            };
            if let Some(candidate) = best_roster_link(&page, name) {
                return Some(candidate);
            }
            debug!(%url, "Roster page has no matching link");
        }
        None
    }

    async fn external_search(&self, name: &str) -> Option<ProfileCandidate> {
        let domain = self.origin.host_str()?;
        let hit = self.external.locate_via_external(name, domain).await?;
        Some(ProfileCandidate {
            url: hit.url,
            match_score: hit.score,
            source_method: SourceMethod::ExternalSearch,
        })
    }

    /// Roster pages in scan order: current, two prior seasons, then the
    /// same three in the list view.
    pub fn roster_urls(&self) -> Vec<Url> {
        let base = format!("/sports/{}/roster", self.sport_path);
        let seasons = self.calendar.prior_roster_labels(2);

        let mut paths = vec![base.clone()];
        paths.extend(seasons.iter().map(|s| format!("{base}/{s}")));
        paths.push(format!("{base}?view=2"));
        paths.extend(seasons.iter().map(|s| format!("{base}/{s}?view=2")));

        paths.iter().filter_map(|path| self.site_url(path)).collect()
    }

    fn site_url(&self, path: &str) -> Option<Url> {
        join_url(&self.origin, path)
            .inspect_err(|e| warn!(error = %e, "Skipping unbuildable site URL"))
            .ok()
    }

    async fn fetch(&self, url: &Url) -> Option<Page> {
        match self.pages.get_page(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                debug!(%url, error = %e, "Skipping page");
                None
            }
        }
    }
}

fn is_roster_link(href: &str) -> bool {
    href.contains("/sports/") && href.contains("/roster/")
}

/// Highest-scoring qualifying roster link on a page; ties keep the first.
fn best_roster_link(page: &Page, name: &str) -> Option<ProfileCandidate> {
    let document = Html::parse_document(&page.body);
    let mut best: Option<ProfileCandidate> = None;
    for a in document.select(&LINK) {
        let Some(href) = a.value().attr("href").filter(|h| is_roster_link(h)) else {
            continue;
        };
        let score = fuzzy_score(name, &element_text(&a));
        if score < ROSTER_LINK_THRESHOLD || best.as_ref().is_some_and(|b| score <= b.match_score) {
            continue;
        }
        if let Ok(url) = page.url.join(href) {
            best = Some(ProfileCandidate {
                url,
                match_score: score,
                source_method: SourceMethod::RosterScan,
            });
        }
    }
    best
}
