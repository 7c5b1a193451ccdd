//! Settings structures for quotes-rs configuration

use anyhow::{bail, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (QUOTES_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("QUOTES_BASE_URL") {
            self.source.base_url = val;
        }
        if let Ok(val) = std::env::var("QUOTES_TIMEOUT") {
            match val.trim().parse() {
                Ok(timeout) => self.outgoing.request_timeout = timeout,
                Err(_) => warn!("Ignoring QUOTES_TIMEOUT={:?}: not a number", val),
            }
        }
        if let Ok(val) = std::env::var("QUOTES_USER_AGENT") {
            self.outgoing.useragent = Some(val);
        }
        if let Ok(val) = std::env::var("QUOTES_VERIFY_SSL") {
            match parse_flag(&val) {
                Some(verify) => self.outgoing.verify_ssl = verify,
                None => warn!("Ignoring QUOTES_VERIFY_SSL={:?}: expected true or false", val),
            }
        }
    }

    /// Reject settings that could never produce a working search
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            bail!("source.base_url must not be empty");
        }
        if url::Url::parse(&self.source.base_url).is_err() {
            bail!("source.base_url is not a valid URL: {}", self.source.base_url);
        }
        if self.source.query_param.trim().is_empty() {
            bail!("source.query_param must not be empty");
        }
        let timeout = self.outgoing.request_timeout;
        if !(timeout.is_finite() && timeout > 0.0) {
            bail!("outgoing.request_timeout must be a positive number of seconds");
        }
        match self.outgoing.max_request_timeout {
            Some(max) if !(max.is_finite() && max > 0.0) => {
                bail!("outgoing.max_request_timeout must be a positive number of seconds");
            }
            Some(_) => {}
            None if timeout > crate::MAX_TIMEOUT as f64 => {
                bail!(
                    "outgoing.request_timeout must not exceed {}s without outgoing.max_request_timeout",
                    crate::MAX_TIMEOUT
                );
            }
            None => {}
        }
        for (field, selector) in self.source.selectors.named() {
            if let Err(e) = Selector::parse(selector) {
                bail!("source.selectors.{} `{}` is invalid: {:?}", field, selector, e);
            }
        }
        Ok(())
    }

    /// Effective request timeout in seconds, clamped to the configured maximum
    pub fn timeout_secs(&self) -> f64 {
        match self.outgoing.max_request_timeout {
            Some(max) => self.outgoing.request_timeout.min(max),
            None => self.outgoing.request_timeout,
        }
    }
}

/// Boolean environment value: true/false, yes/no, on/off or 1/0
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Remote search page and the markup it is parsed against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Short name used in logs
    pub name: String,
    /// Scheme and host of the source, e.g. `https://www.boursorama.com`
    pub base_url: String,
    /// Path of the search endpoint
    pub search_path: String,
    /// Query parameter carrying the search term
    pub query_param: String,
    /// Additional fixed query parameters
    pub extra_params: HashMap<String, String>,
    /// Accept-Language header value
    pub accept_language: String,
    /// CSS selectors for the results markup
    pub selectors: SelectorSettings,
}

impl Default for SourceSettings {
    fn default() -> Self {
        let mut extra_params = HashMap::new();
        extra_params.insert("searchId".to_string(), String::new());

        Self {
            name: "boursorama".to_string(),
            base_url: "https://www.boursorama.com".to_string(),
            search_path: "/recherche/ajax".to_string(),
            query_param: "query".to_string(),
            extra_params,
            accept_language: "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            selectors: SelectorSettings::default(),
        }
    }
}

/// CSS selectors locating the results and each field of a row.
///
/// Field selectors are evaluated relative to the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// Results container; its absence is a parse failure
    pub container: String,
    /// One element per candidate record
    pub row: String,
    /// Element carrying the symbol
    pub symbol: String,
    /// Attribute holding the symbol verbatim. Without it, a link yields the
    /// last path segment of its `href`; any other element yields its text.
    pub symbol_attr: Option<String>,
    pub name: String,
    pub market: String,
    pub last_price: String,
}

impl SelectorSettings {
    /// Selector strings paired with their setting names
    pub fn named(&self) -> [(&'static str, &str); 6] {
        [
            ("container", self.container.as_str()),
            ("row", self.row.as_str()),
            ("symbol", self.symbol.as_str()),
            ("name", self.name.as_str()),
            ("market", self.market.as_str()),
            ("last_price", self.last_price.as_str()),
        ]
    }
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            container: "[data-search-results]".to_string(),
            row: "tr.c-table__row".to_string(),
            symbol: "a.c-link".to_string(),
            symbol_attr: Some("data-symbol".to_string()),
            name: "a.c-link".to_string(),
            market: "td.c-table__cell--market".to_string(),
            last_price: "td.c-table__cell--price".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Upper bound for `request_timeout`
    pub max_request_timeout: Option<f64>,
    /// Fixed user agent (none = random browser user agent)
    pub useragent: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            max_request_timeout: Some(crate::MAX_TIMEOUT as f64),
            useragent: None,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
