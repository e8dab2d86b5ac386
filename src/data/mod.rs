mod lookback;
mod provider;

pub use {
    lookback::{CandleRequest, LookbackPlanner, indicator_history_count},
    provider::{JsonFileProvider, MarketDataProvider, read_history, read_tick_log},
};
