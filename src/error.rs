//! Error types for fetching and scraping.
//!
//! Only [`FetchError`] travels inside the engine; every probe that sees one
//! treats it as "this candidate failed" and moves on. [`ScrapeError`] is
//! reserved for conditions that end a query outright.

use thiserror::Error;

/// Result type alias for query-level operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// A single page fetch that did not produce a document.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be built or parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS, timeout, redirect or body-read failure.
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Errors that abort a whole query.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The resolved athletics hostname does not form a valid site URL.
    #[error("invalid athletics host {host}: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    /// The profile URL was resolved but could not be fetched.
    #[error("profile page unreachable: {0}")]
    ProfileFetch(#[source] FetchError),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::config::ScraperConfig`].
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Writing the JSON outcome failed.
    #[error("failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the JSON outcome failed.
    #[error("failed to serialize outcome: {0}")]
    Serialize(#[from] serde_json::Error),
}
