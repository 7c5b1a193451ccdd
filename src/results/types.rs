//! Result type definitions

use serde::Serialize;
use std::slice;

/// A raw row lifted from the response, before any validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub market: Option<String>,
    pub last_price: Option<String>,
}

/// One matched financial instrument.
///
/// All four fields are guaranteed non-empty. `last_price` is kept exactly as
/// the source formatted it (decimal separator, currency suffix and so on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    symbol: String,
    name: String,
    market: String,
    last_price: String,
}

impl Asset {
    /// Build an asset, or `None` if any field is blank
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        market: impl Into<String>,
        last_price: impl Into<String>,
    ) -> Option<Self> {
        let symbol = clean_field(symbol.into())?;
        let name = clean_field(name.into())?;
        let market = clean_field(market.into())?;
        let last_price = clean_field(last_price.into())?;

        Some(Self {
            symbol,
            name,
            market,
            last_price,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn last_price(&self) -> &str {
        &self.last_price
    }

    /// Fields in display order: symbol, name, market, last price
    pub fn fields(&self) -> [&str; 4] {
        [&self.symbol, &self.name, &self.market, &self.last_price]
    }
}

impl TryFrom<CandidateRecord> for Asset {
    type Error = CandidateRecord;

    /// Hands the record back untouched when a field is missing
    fn try_from(record: CandidateRecord) -> Result<Self, Self::Error> {
        let asset = match (&record.symbol, &record.name, &record.market, &record.last_price) {
            (Some(symbol), Some(name), Some(market), Some(last_price)) => {
                Asset::new(symbol.as_str(), name.as_str(), market.as_str(), last_price.as_str())
            }
            _ => None,
        };
        asset.ok_or(record)
    }
}

/// Collapse inner whitespace runs and reject blank values
fn clean_field(value: String) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Assets in the order the source listed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchResult {
    assets: Vec<Asset>,
}

impl SearchResult {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Asset> {
        self.assets.iter()
    }

}

impl FromIterator<Asset> for SearchResult {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SearchResult {
    type Item = Asset;
    type IntoIter = std::vec::IntoIter<Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a Asset;
    type IntoIter = slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}
