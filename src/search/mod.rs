//! Search execution module
//!
//! Runs one lookup against the configured source: one request, one
//! response, one parse. Retrying is left to callers via [`RetryPolicy`].

mod executor;
mod models;
mod retry;

pub use executor::Search;
pub use models::SearchState;
pub use retry::RetryPolicy;
