//! Search engine module
//!
//! Defines the Engine trait and the source it is implemented for.

mod traits;

pub mod boursorama;

pub use boursorama::Boursorama;
pub use traits::*;
