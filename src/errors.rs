use thiserror::Error;

/// Errors surfaced by the upstream matches API.
///
/// Image resolution and list reconciliation never fail; every branch there
/// has a fallback. Errors only arise at the network edge, plus the one
/// user-facing case of opening a match page for an id the live listing no
/// longer carries.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (DNS, TCP, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Response body was not the JSON we expected.
    #[error("failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        source: reqwest::Error,
    },

    /// Watch page requested a match the live listing does not contain.
    #[error("match {0} not found in the live listing")]
    MatchNotFound(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
