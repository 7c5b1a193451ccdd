//! Result types for asset lookups
//!
//! [`CandidateRecord`] is what the parser lifts out of the page; [`Asset`] is
//! what survives validation; [`SearchResult`] keeps the survivors in order.

mod types;

pub use types::*;
