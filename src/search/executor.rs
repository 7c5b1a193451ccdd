//! Search execution

use super::models::SearchState;
use crate::config::Settings;
use crate::engines::{Boursorama, Engine};
use crate::error::{NetworkFailure, SearchError};
use crate::network::HttpClient;
use crate::query::SearchQuery;
use crate::results::{Asset, SearchResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs a single lookup against one engine.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Search {
    /// HTTP client for making requests
    client: HttpClient,
    /// Source adapter
    engine: Arc<dyn Engine>,
    /// Upper bound for one round trip
    timeout: Duration,
}

impl Search {
    /// Create a new search executor
    pub fn new(client: HttpClient, engine: Arc<dyn Engine>) -> Self {
        let timeout = client.timeout();
        Self {
            client,
            engine,
            timeout,
        }
    }

    /// Build the client and engine described by the settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut outgoing = settings.outgoing.clone();
        outgoing.request_timeout = settings.timeout_secs();

        let client = HttpClient::with_settings(&outgoing)?;
        debug!("User agent: {}", client.user_agent());
        let engine = Boursorama::from_settings(&settings.source)?;
        Ok(Self::new(client, Arc::new(engine)))
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Execute one search: a single request, no retries.
    ///
    /// Returns every asset that could be read from the response, in page
    /// order, or the one failure that ended the call.
    pub async fn execute(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let engine_name = self.engine.name();
        let start = Instant::now();
        let mut state = SearchState::Idle;

        if query.looks_like_isin() {
            debug!("Query '{}' looks like an ISIN", query);
        }

        let request = self.engine.request(query);
        state = state.advance(SearchState::RequestSent, engine_name);

        let result = timeout(
            self.timeout,
            self.client.execute_with_timeout(request, self.timeout),
        )
        .await;

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(failure)) => {
                warn!("Request to {} failed: {}", engine_name, failure);
                state.advance(SearchState::NetworkFailed, engine_name);
                return Err(failure.into());
            }
            Err(_) => {
                warn!("Timeout for engine {} after {:?}", engine_name, self.timeout);
                state.advance(SearchState::NetworkFailed, engine_name);
                return Err(NetworkFailure::Timeout.into());
            }
        };

        state = state.advance(SearchState::ResponseReceived, engine_name);
        debug!(
            "{} answered HTTP {} ({} bytes)",
            engine_name,
            response.status,
            response.text.len()
        );

        let candidates = match self.engine.response(response) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Search on {} failed: {}", engine_name, e);
                let terminal = match e {
                    SearchError::Network(_) => SearchState::NetworkFailed,
                    SearchError::Parse(_) => SearchState::ParseFailed,
                };
                state.advance(terminal, engine_name);
                return Err(e);
            }
        };

        let candidate_count = candidates.len();
        let assets: SearchResult = candidates
            .into_iter()
            .filter_map(|candidate| match Asset::try_from(candidate) {
                Ok(asset) => Some(asset),
                Err(rejected) => {
                    debug!("Dropping incomplete record: {:?}", rejected);
                    None
                }
            })
            .collect();

        state.advance(SearchState::Parsed, engine_name);
        debug!(
            "Engine {} returned {} assets ({} dropped) in {:?}",
            engine_name,
            assets.len(),
            candidate_count - assets.len(),
            start.elapsed()
        );

        Ok(assets)
    }
}
