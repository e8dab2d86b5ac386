//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Every tick applied to a candle series (in-progress updates and roll-overs).
    pub log_candle_update: bool,

    /// Indicator bootstrap and per-roll-over update values.
    pub log_indicator_update: bool,

    /// Lookback planning: required open minutes and the resulting window.
    pub log_lookback: bool,

    /// Attach / detach / series lifecycle inside the store.
    pub log_store: bool,

    pub log_alarms: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_store: true,

    log_candle_update: false,
    log_indicator_update: false,
    log_lookback: false,
    log_alarms: false,
    log_performance: false,
};
