//! Error taxonomy for the lookup pipeline
//!
//! `InvalidQuery` is raised by the normalizer before any request is made.
//! `NetworkFailure` and `ParseFailure` are the two terminal outcomes of a
//! search that did not produce a result set.

use thiserror::Error;

/// The user input could not be turned into a query
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidQuery {
    #[error("search value must be valid and not empty")]
    Empty,
}

/// Transport-level problem reaching the remote source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkFailure {
    #[error("request timed out")]
    Timeout,
    #[error("could not connect to {0}")]
    Connect(String),
    #[error("too many requests (rate limited by the source)")]
    TooManyRequests {
        /// Seconds from the `Retry-After` header, if the source sent one
        retry_after: Option<u64>,
    },
    #[error("access denied (HTTP {0})")]
    AccessDenied(u16),
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    #[error("transport error: {0}")]
    Transport(String),
}

impl NetworkFailure {
    /// Whether a caller may reasonably try the same request again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) | Self::TooManyRequests { .. } => true,
            Self::HttpStatus(code) => *code >= 500,
            Self::AccessDenied(_) | Self::Transport(_) => false,
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, retry_after: Option<u64>) -> Self {
        match status {
            429 => Self::TooManyRequests { retry_after },
            401 | 403 => Self::AccessDenied(status),
            _ => Self::HttpStatus(status),
        }
    }
}

impl From<reqwest::Error> for NetworkFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        if e.is_connect() {
            let target = e
                .url()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_else(|| "remote source".to_string());
            return Self::Connect(target);
        }
        if let Some(status) = e.status() {
            return Self::from_status(status.as_u16(), None);
        }
        let summary = if e.is_body() || e.is_decode() {
            "invalid response body"
        } else if e.is_redirect() {
            "too many redirects"
        } else if e.is_builder() {
            "invalid request"
        } else {
            "request failed"
        };
        Self::Transport(summary.to_string())
    }
}

/// The response could not be read as a results page at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("results container `{selector}` not found in response")]
    MissingContainer { selector: String },
    #[error("the source answered with an anti-bot challenge page")]
    Blocked,
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Terminal failure of a single search call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("network failure: {0}")]
    Network(#[from] NetworkFailure),
    #[error("parse failure: {0}")]
    Parse(#[from] ParseFailure),
}

impl SearchError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(failure) => failure.is_transient(),
            Self::Parse(_) => false,
        }
    }
}
