//! HTTP networking module
//!
//! Provides the HTTP client used to reach the remote source.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::generate_user_agent;
