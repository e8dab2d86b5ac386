//! File layout for recorded history used by the replay tooling.
use crate::config::Resolution;

/// Configuration for recorded candle history on disk
pub struct HistoryPersistenceConfig {
    /// Directory path holding history files
    pub directory: &'static str,
    /// Base filename for history files (without extension)
    pub filename_base: &'static str,
}

pub const PERSISTENCE: HistoryPersistenceConfig = HistoryPersistenceConfig {
    directory: "history",
    filename_base: "ohlcv",
};

/// Generate the history filename for one (symbol, resolution)
/// Example: "ohlcv_AAPL_60.json"
pub fn history_filename(symbol: &str, resolution: Resolution) -> String {
    format!(
        "{}_{}_{}.json",
        PERSISTENCE.filename_base,
        symbol,
        resolution.code()
    )
}
