//! Last-resort profile lookup through an external search index.
//!
//! The locator only sees the [`ExternalLocator`] trait. `Option<T>` implements
//! it too, so a missing credential is simply `None` and costs nothing: no
//! branch in the locator checks for it.
//!
//! # Provider
//!
//! [`SerpApiSearch`] queries SerpApi's Google engine with
//! `site:<domain> "<name>" roster <sport hint>` and ranks the organic results
//! with [`external_result_score`].

use crate::matching::{external_result_score, EXTERNAL_ACCEPT_SCORE};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Best-effort URL lookup outside the athletics site itself.
pub trait ExternalLocator {
    /// A profile URL for `name` on `domain`, or `None`. Never an error.
    async fn locate_via_external(&self, name: &str, domain: &str) -> Option<ExternalHit>;
}

/// An accepted external search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalHit {
    pub url: Url,
    pub score: u8,
}

impl<T: ExternalLocator> ExternalLocator for Option<T> {
    async fn locate_via_external(&self, name: &str, domain: &str) -> Option<ExternalHit> {
        match self {
            Some(inner) => inner.locate_via_external(name, domain).await,
            None => None,
        }
    }
}

/// Organic result as returned by the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

/// SerpApi-backed [`ExternalLocator`].
#[derive(Clone)]
pub struct SerpApiSearch {
    client: Client,
    api_key: String,
    endpoint: String,
    sport_path: String,
    sport_hint: String,
}

impl std::fmt::Debug for SerpApiSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiSearch")
            .field("endpoint", &self.endpoint)
            .field("sport_path", &self.sport_path)
            .field("sport_hint", &self.sport_hint)
            .finish_non_exhaustive()
    }
}

impl SerpApiSearch {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        sport_path: impl Into<String>,
        sport_hint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: SERPAPI_ENDPOINT.to_string(),
            sport_path: sport_path.into(),
            sport_hint: sport_hint.into(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// `Some` only when a non-blank key is present.
    pub fn from_key(
        client: Client,
        api_key: Option<&str>,
        sport_path: &str,
        sport_hint: &str,
    ) -> Option<Self> {
        let key = api_key.map(str::trim).filter(|k| !k.is_empty())?;
        Some(Self::new(client, key, sport_path, sport_hint))
    }

    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, reqwest::Error> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("hl", "en"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => Ok(parsed.organic_results),
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&body, 300),
                    "Search API returned non-conforming JSON"
                );
                Ok(Vec::new())
            }
        }
    }
}

impl ExternalLocator for SerpApiSearch {
    #[instrument(level = "info", skip(self))]
    async fn locate_via_external(&self, name: &str, domain: &str) -> Option<ExternalHit> {
        let query = format!("site:{domain} \"{name}\" roster {}", self.sport_hint);
        let results = match self.search(&query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "External search failed; continuing without it");
                return None;
            }
        };
        debug!(count = results.len(), "External search results");
        let hit = rank_results(name, &self.sport_path, &results);
        if let Some(hit) = &hit {
            info!(url = %hit.url, score = hit.score, "Accepted external search result");
        }
        hit
    }
}

/// The top-scoring result, if it reaches [`EXTERNAL_ACCEPT_SCORE`].
///
/// Ties keep the API's order. Results whose link is not a valid URL are
/// skipped.
pub fn rank_results(name: &str, sport_path: &str, results: &[OrganicResult]) -> Option<ExternalHit> {
    let mut best: Option<ExternalHit> = None;
    for result in results {
        let score = external_result_score(name, sport_path, &result.link, &result.title, &result.snippet);
        let Ok(url) = Url::parse(&result.link) else {
            continue;
        };
        if best.as_ref().is_none_or(|top| score > top.score) {
            best = Some(ExternalHit { url, score });
        }
    }
    best.filter(|hit| hit.score >= EXTERNAL_ACCEPT_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result(link: &str, title: &str, snippet: &str) -> OrganicResult {
        OrganicResult {
            link: link.to_string(),
            title: title.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_rank_prefers_roster_links() {
        let results = vec![
            result("https://athletics.stolaf.edu/news/2024/recap", "Abdirasak Bulale scores twice", ""),
            result(
                "https://athletics.stolaf.edu/sports/mens-soccer/roster/abdirasak-bulale/8123",
                "Abdirasak Bulale - Men's Soccer",
                "",
            ),
        ];
        let hit = rank_results("Abdirasak Bulale", "mens-soccer", &results).unwrap();
        assert_eq!(hit.score, 10);
        assert!(hit.url.path().contains("/roster/"));
    }

    #[test]
    fn test_rank_rejects_weak_results() {
        let results = vec![result("https://athletics.stolaf.edu/news/2024/recap", "Oles roll", "")];
        assert_eq!(rank_results("Abdirasak Bulale", "mens-soccer", &results), None);
        assert_eq!(rank_results("Abdirasak Bulale", "mens-soccer", &[]), None);
    }

    #[test]
    fn test_rank_skips_invalid_links() {
        let results = vec![result("/sports/mens-soccer/roster/x", "Abdirasak Bulale", "")];
        assert_eq!(rank_results("Abdirasak Bulale", "mens-soccer", &results), None);
    }

    #[test]
    fn test_from_key_requires_non_blank_key() {
        let client = Client::new();
        assert!(SerpApiSearch::from_key(client.clone(), None, "mens-soccer", "men's soccer").is_none());
        assert!(SerpApiSearch::from_key(client.clone(), Some("  "), "mens-soccer", "men's soccer").is_none());
        assert!(SerpApiSearch::from_key(client, Some("abc"), "mens-soccer", "men's soccer").is_some());
    }

    #[tokio::test]
    async fn test_absent_locator_is_noop() {
        let absent: Option<SerpApiSearch> = None;
        assert_eq!(
            absent.locate_via_external("Abdirasak Bulale", "athletics.stolaf.edu").await,
            None
        );
    }

    #[tokio::test]
    async fn test_serpapi_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("engine", "google"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic_results": [
                    {
                        "link": "https://athletics.stolaf.edu/sports/mens-soccer/roster/abdirasak-bulale/8123",
                        "title": "Abdirasak Bulale - 2024 Men's Soccer Roster",
                        "snippet": "Forward from Minneapolis"
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let search = SerpApiSearch::new(Client::new(), "secret", "mens-soccer", "men's soccer")
            .with_endpoint(format!("{}/search.json", server.uri()));
        let hit = search
            .locate_via_external("Abdirasak Bulale", "athletics.stolaf.edu")
            .await
            .unwrap();
        assert_eq!(
            hit.url.as_str(),
            "https://athletics.stolaf.edu/sports/mens-soccer/roster/abdirasak-bulale/8123"
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn test_serpapi_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let search = SerpApiSearch::new(Client::new(), "bad", "mens-soccer", "men's soccer")
            .with_endpoint(format!("{}/search.json", server.uri()));
        assert_eq!(
            search.locate_via_external("Abdirasak Bulale", "athletics.stolaf.edu").await,
            None
        );
    }
}
