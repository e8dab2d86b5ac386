//! Value types shared across the engine (resolutions, chart ids, indicator parameters).

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::EnumIter;

use crate::utils::TimeUtils;

/// Candle bucket identifier as used on the wire (`"1"`, `"5"`, ..., `"D"`, `"W"`, `"M"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Resolution {
    #[serde(rename = "1")]
    Minute1,
    #[serde(rename = "5")]
    Minute5,
    #[serde(rename = "10")]
    Minute10,
    #[serde(rename = "15")]
    Minute15,
    #[serde(rename = "30")]
    Minute30,
    #[serde(rename = "60")]
    Hour1,
    #[serde(rename = "240")]
    Hour4,
    #[serde(rename = "D")]
    Day,
    #[serde(rename = "W")]
    Week,
    #[serde(rename = "M")]
    Month,
}

impl Resolution {
    /// Wire code understood by the candle endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Minute1 => "1",
            Self::Minute5 => "5",
            Self::Minute10 => "10",
            Self::Minute15 => "15",
            Self::Minute30 => "30",
            Self::Hour1 => "60",
            Self::Hour4 => "240",
            Self::Day => "D",
            Self::Week => "W",
            Self::Month => "M",
        }
    }

    /// Bucket length in minutes. Month is the 365/12-day approximation.
    pub fn minutes(&self) -> i64 {
        match self {
            Self::Minute1 => 1,
            Self::Minute5 => 5,
            Self::Minute10 => 10,
            Self::Minute15 => 15,
            Self::Minute30 => 30,
            Self::Hour1 => 60,
            Self::Hour4 => 240,
            Self::Day => 1440,
            Self::Week => 7 * 1440,
            Self::Month => 43_800,
        }
    }

    pub fn bucket_secs(&self) -> i64 {
        self.minutes() * 60
    }

    /// For derived resolutions: the base resolution they are merged from and how many
    /// base candles make up one derived candle.
    pub fn derivation(&self) -> Option<(Resolution, usize)> {
        match self {
            Self::Minute10 => Some((Self::Minute5, 2)),
            Self::Hour4 => Some((Self::Hour1, 4)),
            _ => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.derivation().is_some()
    }

    /// The resolution that has to be requested upstream to build this one.
    pub fn request_resolution(&self) -> Resolution {
        self.derivation().map_or(*self, |(base, _)| base)
    }

    /// Start of the bucket that contains `ts` (unix seconds, UTC).
    pub fn bucket_start(&self, ts: i64) -> i64 {
        match self {
            Self::Week => {
                let since_monday =
                    (ts - TimeUtils::EPOCH_TO_MONDAY_S).rem_euclid(TimeUtils::S_IN_W);
                ts - since_monday
            }
            Self::Month => {
                month_start(ts).unwrap_or_else(|| ts - ts.rem_euclid(self.bucket_secs()))
            }
            _ => ts - ts.rem_euclid(self.bucket_secs()),
        }
    }

    /// Start of the bucket following the one that starts at `start`.
    pub fn next_bucket_start(&self, start: i64) -> i64 {
        match self {
            Self::Month => next_month_start(start).unwrap_or(start + self.bucket_secs()),
            _ => start + self.bucket_secs(),
        }
    }
}

fn month_start(ts: i64) -> Option<i64> {
    let date = DateTime::from_timestamp(ts, 0)?.date_naive();
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    Some(first.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn next_month_start(ts: i64) -> Option<i64> {
    let date = DateTime::from_timestamp(ts, 0)?.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(first.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Minute1 => write!(f, "1m"),
            Self::Minute5 => write!(f, "5m"),
            Self::Minute10 => write!(f, "10m"),
            Self::Minute15 => write!(f, "15m"),
            Self::Minute30 => write!(f, "30m"),
            Self::Hour1 => write!(f, "1h"),
            Self::Hour4 => write!(f, "4h"),
            Self::Day => write!(f, "1D"),
            Self::Week => write!(f, "1W"),
            Self::Month => write!(f, "1M"),
        }
    }
}

impl FromStr for Resolution {
    type Err = crate::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Minute1),
            "5" => Ok(Self::Minute5),
            "10" => Ok(Self::Minute10),
            "15" => Ok(Self::Minute15),
            "30" => Ok(Self::Minute30),
            "60" => Ok(Self::Hour1),
            "240" => Ok(Self::Hour4),
            "D" => Ok(Self::Day),
            "W" => Ok(Self::Week),
            "M" => Ok(Self::Month),
            other => Err(crate::EngineError::UnknownResolution(other.to_string())),
        }
    }
}

/// Identifier the view layer assigns to one chart window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(u32);

impl ChartId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chart#{}", self.0)
    }
}

/// Number of closes an indicator window spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(usize);

impl Period {
    pub const fn new(val: usize) -> Self {
        Self(val)
    }

    #[inline]
    pub fn value(self) -> usize {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard-deviation multiplier of a Bollinger band.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandFactor(f64);

impl BandFactor {
    pub const fn new(val: f64) -> Self {
        Self(val)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for BandFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
