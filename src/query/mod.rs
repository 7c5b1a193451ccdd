//! Query normalization
//!
//! Turns raw user input into a [`SearchQuery`] the remote search page accepts:
//! - control characters are dropped (whitespace controls become a space)
//! - invisible format characters (zero-width space, BOM, bidi marks) are dropped
//! - surrounding whitespace is trimmed
//!
//! ISIN codes and free-text names go through the same path; the value is
//! never rewritten based on its shape.

use crate::error::InvalidQuery;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// ISO 6166 layout: country prefix, 9 alphanumerics, check digit
static ISIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").expect("static ISIN pattern"));

/// A cleaned, non-empty search term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Normalize raw input, rejecting it if nothing usable remains
    pub fn parse(raw: &str) -> Result<Self, InvalidQuery> {
        let cleaned: String = raw
            .chars()
            .filter_map(|c| {
                if c.is_whitespace() && c.is_control() {
                    Some(' ')
                } else if c.is_control() || is_invisible_format(c) {
                    None
                } else {
                    Some(c)
                }
            })
            .collect();

        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return Err(InvalidQuery::Empty);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the query is shaped like an ISIN and its check digit is valid.
    ///
    /// Informational only: the query is sent unchanged either way.
    pub fn looks_like_isin(&self) -> bool {
        is_valid_isin(&self.0)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize raw user input into a [`SearchQuery`]
pub fn normalize(raw: &str) -> Result<SearchQuery, InvalidQuery> {
    SearchQuery::parse(raw)
}

/// Zero-width and bidi formatting characters that render as nothing
fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// Check an ISIN's layout and its Luhn check digit
pub fn is_valid_isin(value: &str) -> bool {
    if !ISIN_RE.is_match(value) {
        return false;
    }

    // Letters expand to two digits (A=10 .. Z=35)
    let mut digits = Vec::with_capacity(24);
    for c in value.chars() {
        match c.to_digit(36) {
            Some(d) if d >= 10 => {
                digits.push(d / 10);
                digits.push(d % 10);
            }
            Some(d) => digits.push(d),
            None => return false,
        }
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
