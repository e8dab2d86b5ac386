use chrono::DateTime;

pub type AppInstant = web_time::Instant;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const S_IN_MIN: i64 = 60;
    pub const S_IN_H: i64 = Self::S_IN_MIN * 60;
    pub const S_IN_D: i64 = Self::S_IN_H * 24;
    pub const S_IN_W: i64 = Self::S_IN_D * 7;
    pub const MIN_IN_D: i64 = 1440;
    /// 1970-01-01 was a Thursday; the first Monday 00:00 UTC is four days later.
    pub const EPOCH_TO_MONDAY_S: i64 = Self::S_IN_D * 4;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    #[inline]
    pub fn ms_to_secs(ms: i64) -> i64 {
        ms.div_euclid(Self::MS_IN_S)
    }
}

// Time Helper functions

/// Used for display purposes only.
pub fn epoch_sec_to_utc(epoch_sec: i64) -> String {
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => format!("{}", dt.format(TimeUtils::STANDARD_TIME_FORMAT)),
        None => format!("invalid({epoch_sec})"),
    }
}

pub fn format_duration_mins(mins: i64) -> String {
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h {}m", hours, mins % 60);
    }
    let days = hours / 24;
    format!("{}d {}h", days, hours % 24)
}
