use {
    crate::{
        config::{ChartId, Resolution},
        domain::Candle,
        models::{AlarmDirection, IndicatorParams},
    },
    serde::{Deserialize, Serialize},
};

/// One trade from the live feed. Field names follow the trade stream (`s`, `p`, `t`, `v`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub price: f64,
    /// Milliseconds since the epoch.
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    /// Volume traded since the previous tick.
    #[serde(rename = "v", default)]
    pub volume: f64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp_ms: i64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp_ms,
            volume,
        }
    }
}

/// Notifications for the rendering layer, queued in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    PriceChanged {
        symbol: String,
        price: f64,
    },
    /// Emitted after every indicator of the series' charts has advanced.
    CandleClosed {
        symbol: String,
        resolution: Resolution,
        candle: Candle,
        charts: Vec<ChartId>,
    },
    AlarmTriggered {
        symbol: String,
        threshold: f64,
        direction: AlarmDirection,
        price: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOutcome {
    /// A new candle series was bootstrapped for this chart.
    pub series_created: bool,
    /// First series of the symbol; the live feed needs a subscription.
    pub subscribe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetachOutcome {
    /// The chart was the last one on its series.
    pub series_removed: bool,
    /// The symbol has no series left.
    pub symbol_removed: bool,
    /// No series and no alarm watch the symbol; the live feed can be dropped.
    pub unsubscribe: bool,
    /// Indicators the chart carried.
    pub indicators: Vec<IndicatorParams>,
}
