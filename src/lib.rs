#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod replay;
pub mod utils;

// Re-export commonly used types outside of crate (for the binaries and tests)
pub use config::{ChartId, ENGINE, EngineConfig, PERSISTENCE, Resolution};
pub use data::{CandleRequest, JsonFileProvider, LookbackPlanner, MarketDataProvider};
pub use domain::{Candle, SeriesKey};
pub use engine::{EngineError, MarketDataStore, StoreEvent, Tick};
pub use models::{HistoricalOhlcv, IndicatorKind, IndicatorParams};

// CLI argument parsing
use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Symbol to chart
    #[arg(long, default_value = "AAPL")]
    pub symbol: String,

    /// Chart resolution wire code: 1, 5, 10, 15, 30, 60, 240, D, W or M
    #[arg(long, default_value = "1")]
    pub resolution: Resolution,

    /// Directory holding recorded history responses
    #[arg(long, default_value = PERSISTENCE.directory)]
    pub history_dir: PathBuf,

    /// Recorded trades, one JSON object per line
    #[arg(long)]
    pub ticks: Option<PathBuf>,

    /// Candles kept per series
    #[arg(long, default_value_t = ENGINE.window_size)]
    pub window: usize,

    /// Moving average period (repeatable)
    #[arg(long = "ma")]
    pub moving_averages: Vec<usize>,

    /// Bollinger bands as "period/period/factor" (repeatable)
    #[arg(long = "bb")]
    pub bollinger: Vec<String>,

    /// Price alarm threshold (repeatable)
    #[arg(long = "alarm")]
    pub alarms: Vec<f64>,

    /// Plan the history request as of this unix second instead of the first trade
    #[arg(long)]
    pub at: Option<i64>,
}

impl Cli {
    /// Indicator parameters given on the command line, validated against `config`.
    pub fn indicator_params(
        &self,
        config: &EngineConfig,
    ) -> Result<Vec<IndicatorParams>, EngineError> {
        let mut params: Vec<IndicatorParams> = self
            .moving_averages
            .iter()
            .map(|&p| IndicatorParams::moving_average(p))
            .collect();
        for text in &self.bollinger {
            params.push(IndicatorParams::from_text(IndicatorKind::BollingerBands, text)?);
        }
        for p in &params {
            p.validate(config)?;
        }
        Ok(params)
    }
}
