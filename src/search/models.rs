//! Search lifecycle model

use std::fmt;
use tracing::debug;

/// Where a single search call currently is.
///
/// `Parsed`, `ParseFailed` and `NetworkFailed` are terminal: a call never
/// goes back to `RequestSent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    RequestSent,
    ResponseReceived,
    Parsed,
    ParseFailed,
    NetworkFailed,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Parsed | Self::ParseFailed | Self::NetworkFailed)
    }

    /// Whether `next` is a legal step from this state
    pub fn can_advance_to(self, next: SearchState) -> bool {
        use SearchState::*;
        matches!(
            (self, next),
            (Idle, RequestSent)
                | (RequestSent, ResponseReceived)
                | (RequestSent, NetworkFailed)
                | (ResponseReceived, Parsed)
                | (ResponseReceived, ParseFailed)
                | (ResponseReceived, NetworkFailed)
        )
    }

    /// Move to `next`, logging the transition
    pub fn advance(self, next: SearchState, engine: &str) -> SearchState {
        debug_assert!(
            self.can_advance_to(next),
            "illegal search transition {} -> {}",
            self,
            next
        );
        debug!("{}: {} -> {}", engine, self, next);
        next
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RequestSent => "request_sent",
            Self::ResponseReceived => "response_received",
            Self::Parsed => "parsed",
            Self::ParseFailed => "parse_failed",
            Self::NetworkFailed => "network_failed",
        }
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
