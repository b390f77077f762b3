//! Page fetching with exponential backoff retry logic.
//!
//! # Architecture
//!
//! The module uses a trait-based design so probes never care how pages arrive:
//! - [`PageSource`]: Core trait defining an async page GET
//! - [`HttpFetcher`]: Wraps a shared `reqwest::Client` (headers, timeout, redirects)
//! - [`RetryFetch`]: Decorator that adds retry logic to any `PageSource`
//!
//! # Retry Strategy
//!
//! - 3 total attempts per fetch
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 8 seconds
//! - Random jitter (0-250ms) added to each delay
//!
//! Retries are local to one fetch; a probe that still sees a [`FetchError`]
//! moves on to its next candidate.

use crate::config::ScraperConfig;
use crate::error::FetchError;
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// A fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL after redirects; relative links resolve against it.
    pub url: Url,
    pub body: String,
}

/// Anything that can GET a page.
pub trait PageSource {
    async fn get_page(&self, url: &Url) -> Result<Page, FetchError>;
}

impl<T: PageSource> PageSource for &T {
    async fn get_page(&self, url: &Url) -> Result<Page, FetchError> {
        (**self).get_page(url).await
    }
}

/// Plain HTTP GET over a shared client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the per-query client: default headers, timeout, redirect following.
    pub fn build_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }
        Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    async fn get_page(&self, url: &Url) -> Result<Page, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let final_url = response.url().clone();
        let body = response.text().await.map_err(transport)?;
        debug!(%final_url, bytes = body.len(), "Fetched page");
        Ok(Page {
            url: final_url,
            body,
        })
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`PageSource`].
///
/// The delay before attempt `n + 1` is:
/// ```text
/// delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=jitter)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    /// Total attempts, including the first one.
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Duration,
}

impl<T: PageSource> RetryFetch<T> {
    pub fn new(inner: T, max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter: Duration::from_millis(250),
        }
    }

    pub fn from_config(inner: T, config: &ScraperConfig) -> Self {
        Self::new(
            inner,
            config.max_attempts,
            config.backoff_base(),
            config.backoff_max(),
        )
        .with_jitter(Duration::from_millis(config.backoff_jitter_ms))
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after the `attempt`-th failure (1-based), before jitter.
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: PageSource> PageSource for RetryFetch<T> {
    #[instrument(level = "info", skip_all, fields(url = %url))]
    async fn get_page(&self, url: &Url) -> Result<Page, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.get_page(url).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms = self.jitter.as_millis() as u64;
                    let jitter = if jitter_ms == 0 {
                        Duration::ZERO
                    } else {
                        Duration::from_millis(rng().random_range(0..=jitter_ms))
                    };
                    let delay = self.backoff_for(attempt) + jitter;

                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Join a site path onto `base`, reporting failures as [`FetchError::InvalidUrl`].
pub fn join_url(base: &Url, path: &str) -> Result<Url, FetchError> {
    base.join(path).map_err(|source| FetchError::InvalidUrl {
        url: format!("{base}{path}"),
        source,
    })
}
