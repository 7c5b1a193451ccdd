//! Boursorama search page engine
//!
//! The search endpoint answers with an HTML fragment: a results container
//! holding one table row per instrument. Which elements carry which field
//! is driven by [`SelectorSettings`], so markup drift is a settings change.

use super::traits::*;
use crate::config::{SelectorSettings, SourceSettings};
use crate::error::{NetworkFailure, ParseFailure, SearchError};
use crate::query::SearchQuery;
use crate::results::CandidateRecord;
use anyhow::{Context, Result as AnyhowResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled form of [`SelectorSettings`]
#[derive(Debug, Clone)]
pub struct Selectors {
    container: (String, Selector),
    row: Selector,
    symbol: Selector,
    symbol_attr: Option<String>,
    name: Selector,
    market: Selector,
    last_price: Selector,
}

impl Selectors {
    pub fn compile(settings: &SelectorSettings) -> Result<Self, ParseFailure> {
        Ok(Self {
            container: (settings.container.clone(), compile(&settings.container)?),
            row: compile(&settings.row)?,
            symbol: compile(&settings.symbol)?,
            symbol_attr: settings.symbol_attr.clone().filter(|a| !a.is_empty()),
            name: compile(&settings.name)?,
            market: compile(&settings.market)?,
            last_price: compile(&settings.last_price)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ParseFailure> {
    Selector::parse(selector).map_err(|e| ParseFailure::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Search engine for the Boursorama instrument search
pub struct Boursorama {
    name: String,
    base_url: Url,
    endpoint: Url,
    query_param: String,
    extra_params: Vec<(String, String)>,
    accept_language: String,
    selectors: Selectors,
}

impl Boursorama {
    pub fn new() -> AnyhowResult<Self> {
        Self::from_settings(&SourceSettings::default())
    }

    pub fn from_settings(settings: &SourceSettings) -> AnyhowResult<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid base URL: {}", settings.base_url))?;
        let endpoint = base_url
            .join(&settings.search_path)
            .with_context(|| format!("invalid search path: {}", settings.search_path))?;
        let selectors = Selectors::compile(&settings.selectors)?;

        // Stable parameter order keeps request URLs reproducible
        let mut extra_params: Vec<_> = settings
            .extra_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        extra_params.sort();

        Ok(Self {
            name: settings.name.clone(),
            base_url,
            endpoint,
            query_param: settings.query_param.clone(),
            extra_params,
            accept_language: settings.accept_language.clone(),
            selectors,
        })
    }
}

impl Engine for Boursorama {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, query: &SearchQuery) -> EngineRequest {
        let mut request = EngineRequest::get(self.endpoint.clone())
            .header("Accept-Language", self.accept_language.as_str())
            .param(self.query_param.as_str(), query.as_str());

        for (key, value) in &self.extra_params {
            request = request.param(key.as_str(), value.as_str());
        }

        request
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<CandidateRecord>, SearchError> {
        if !response.is_success() {
            return Err(NetworkFailure::from_status(response.status, response.retry_after()).into());
        }

        Ok(parse_candidates(&response.text, &self.selectors, &self.base_url)?)
    }
}

/// Extract candidate records from a results page, in page order.
///
/// Fails only when the results container itself cannot be found. Rows with
/// missing fields come back with `None` in those fields.
pub fn parse_candidates(
    html: &str,
    selectors: &Selectors,
    base_url: &Url,
) -> Result<Vec<CandidateRecord>, ParseFailure> {
    let document = Html::parse_document(html);

    let (container_css, container_selector) = &selectors.container;
    let container = match document.select(container_selector).next() {
        Some(c) => c,
        None if is_captcha(html) => return Err(ParseFailure::Blocked),
        None => {
            return Err(ParseFailure::MissingContainer {
                selector: container_css.clone(),
            })
        }
    };

    let records = container
        .select(&selectors.row)
        .map(|row| CandidateRecord {
            symbol: row
                .select(&selectors.symbol)
                .next()
                .and_then(|el| extract_symbol(el, selectors.symbol_attr.as_deref(), base_url)),
            name: first_text(row, &selectors.name),
            market: first_text(row, &selectors.market),
            last_price: first_text(row, &selectors.last_price),
        })
        .collect();

    Ok(records)
}

/// Symbol from the configured attribute, the link target, or the text
fn extract_symbol(element: ElementRef, attr: Option<&str>, base_url: &Url) -> Option<String> {
    if let Some(value) = attr.and_then(|a| element.value().attr(a)) {
        if let Some(symbol) = non_empty(value) {
            return Some(symbol);
        }
    }

    // Links point at the quote page, e.g. /cours/1rPTTE/
    if let Some(href) = element.value().attr("href") {
        return base_url.join(href).ok().and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .and_then(non_empty)
        });
    }

    // The text of a link is its label, not a symbol
    if element.value().name() == "a" {
        return None;
    }

    non_empty(&element.text().collect::<String>())
}

fn first_text(row: ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .and_then(|el| non_empty(&el.text().collect::<String>()))
}

fn non_empty(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
