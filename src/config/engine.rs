//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

/// Fixed single-window trading day. Minutes are counted from local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingCalendar {
    pub open_minute: i64,
    pub close_minute: i64,
}

impl TradingCalendar {
    /// Minutes the market is open on a trading day.
    pub const fn open_span(&self) -> i64 {
        self.close_minute - self.open_minute
    }

    /// Minutes the market is closed on a trading day.
    pub const fn closed_span(&self) -> i64 {
        1440 - self.open_span()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Candles kept per series, and points kept per indicator.
    pub window_size: usize,
    /// Inclusive upper bound for indicator periods.
    pub max_period: usize,
    /// Inclusive upper bound for Bollinger factors.
    pub max_factor: f64,
    pub calendar: TradingCalendar,
}

impl Default for EngineConfig {
    fn default() -> Self {
        ENGINE
    }
}

pub const ENGINE: EngineConfig = EngineConfig {
    window_size: 90,
    max_period: 400,
    max_factor: 5.0,
    calendar: TradingCalendar {
        open_minute: 480,
        close_minute: 1320,
    },
};
