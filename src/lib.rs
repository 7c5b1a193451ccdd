//! quotes-rs: look up financial assets by name or ISIN
//!
//! The pipeline has two steps:
//! - [`normalize`] cleans raw user input into a [`SearchQuery`]
//! - [`Search::execute`] (or [`search`]) sends it to the remote source and
//!   reads the answer into an ordered [`SearchResult`]
//!
//! ```no_run
//! # async fn lookup() -> anyhow::Result<()> {
//! let query = quotes_rs::normalize("  FR0000120271 ")?;
//! let settings = quotes_rs::config::load(None)?;
//! for asset in &quotes_rs::search(&query, &settings).await? {
//!     println!("{} {}", asset.symbol(), asset.last_price());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! An empty [`SearchResult`] means "no match" and is not an error.

pub mod config;
pub mod engines;
pub mod error;
pub mod network;
pub mod output;
pub mod query;
pub mod results;
pub mod search;

pub use config::Settings;
pub use error::{InvalidQuery, NetworkFailure, ParseFailure, SearchError};
pub use query::{normalize, SearchQuery};
pub use results::{Asset, SearchResult};
pub use search::{RetryPolicy, Search};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for source requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Maximum timeout that can be set
pub const MAX_TIMEOUT: u64 = 30;

/// Search once with a client and engine built from `settings`.
///
/// Settings that cannot produce a client or engine are reported as a plain
/// error; a failed lookup carries a [`SearchError`] that can be recovered
/// with `downcast_ref`. Keep a [`Search`] around instead when issuing many
/// queries.
pub async fn search(query: &SearchQuery, settings: &Settings) -> anyhow::Result<SearchResult> {
    let search = Search::from_settings(settings)?;
    Ok(search.execute(query).await?)
}
