/// Extra candles requested on top of the desired count before lookback planning.
pub const REQUEST_PADDING: i64 = 2;

pub mod lookback {
    /// Additional padding for 1-minute requests (ticks around the open are sparse).
    pub const MINUTE_PADDING: i64 = 3;
    /// Additional padding for 10-minute requests (one spare 5-minute pair each side).
    pub const TEN_MINUTE_PADDING: i64 = 2;

    pub const DAILY_STRETCH: f64 = 1.4;
    /// Extra days/weeks/months appended to non-intraday lookbacks.
    pub const CALENDAR_SLACK: i64 = 4;
    /// Upper bound on a month used when converting months to minutes.
    pub const MONTH_DAYS: i64 = 31;
}

pub mod alarms {
    /// Relative distance under which two thresholds count as the same alarm.
    pub const THRESHOLD_EPSILON: f64 = 1e-9;
}
