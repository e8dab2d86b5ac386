use {
    crate::config::Resolution,
    serde::{Deserialize, Serialize},
};

/// Identity of one candle series: the symbol plus the bucket it is drawn at.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SeriesKey {
    pub symbol: String,
    pub resolution: Resolution,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} @ {} ({})", self.symbol, self.resolution, self.resolution.code())
    }
}
