//! Engine traits and types

use crate::error::SearchError;
use crate::query::SearchQuery;
use crate::results::CandidateRecord;
use std::collections::HashMap;
use url::Url;

/// HTTP GET request to be made for a search
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Endpoint, without the query string
    pub url: Url,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters, in the order they are sent
    pub params: Vec<(String, String)>,
}

impl EngineRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: HashMap::new(),
            params: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Full URL including the encoded query string
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }
}

/// HTTP response from a search request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, lowercase names
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
}

impl EngineResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Delay requested by a `Retry-After` header, in seconds
    pub fn retry_after(&self) -> Option<u64> {
        self.headers
            .get("retry-after")
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Check if a page is an anti-bot challenge rather than content
pub fn is_captcha(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("captcha")
        || lower.contains("unusual traffic")
        || lower.contains("automated requests")
        || lower.contains("cf-challenge")
}

/// A remote source that can be searched for assets.
///
/// Building the request and reading the response are kept apart from the
/// transport so both halves can be exercised without a network.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Build the HTTP request for a search
    fn request(&self, query: &SearchQuery) -> EngineRequest;

    /// Turn a response into candidate records, in page order
    fn response(&self, response: EngineResponse) -> Result<Vec<CandidateRecord>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url_encodes_params() {
        let request = EngineRequest::get(Url::parse("https://example.com/search").unwrap())
            .param("query", "Société Générale")
            .param("searchId", "");

        let url = request.full_url();
        assert_eq!(url.path(), "/search");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "Société Générale".to_string()),
                ("searchId".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_retry_after() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), "120".to_string());
        let response = EngineResponse {
            status: 429,
            headers,
            text: String::new(),
        };

        assert!(!response.is_success());
        assert_eq!(response.retry_after(), Some(120));
    }

    #[test]
    fn test_captcha_detection() {
        assert!(is_captcha("<title>Verify you are human</title><div class=\"g-recaptcha\">"));
        assert!(!is_captcha("<div data-search-results></div>"));
    }
}
