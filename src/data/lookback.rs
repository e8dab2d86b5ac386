//! How far back a history request has to reach so that it returns enough candles, given a
//! market that only trades inside one fixed window on weekdays.

use {
    crate::{
        config::{
            DF, Resolution, TradingCalendar,
            constants::{REQUEST_PADDING, lookback},
        },
        models::converter::required_base_candles,
        utils::{TimeUtils, epoch_sec_to_utc, format_duration_mins},
    },
    chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike, Weekday},
    serde::{Deserialize, Serialize},
};

/// Everything the fetch collaborator needs for one history request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleRequest {
    pub symbol: String,
    /// Resolution the chart displays.
    pub resolution: Resolution,
    /// Resolution to request upstream (the base resolution for derived ones).
    pub request_resolution: Resolution,
    /// Unix seconds.
    pub from: i64,
    /// Unix seconds.
    pub to: i64,
    pub lookback_minutes: i64,
    /// Candles of `request_resolution` the response must contain.
    pub required_candles: usize,
}

impl std::fmt::Display for CandleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (as {}) from {} to {} [{} back, need {} candles]",
            self.symbol,
            self.resolution,
            self.request_resolution,
            epoch_sec_to_utc(self.from),
            epoch_sec_to_utc(self.to),
            format_duration_mins(self.lookback_minutes),
            self.required_candles
        )
    }
}

/// Number of candles to request so that `window_size` points of a `period` indicator can be built.
pub fn indicator_history_count(window_size: usize, period: usize) -> usize {
    window_size + 1 + period
}

#[derive(Debug, Clone, Copy)]
pub struct LookbackPlanner {
    calendar: TradingCalendar,
}

impl LookbackPlanner {
    pub fn new(calendar: TradingCalendar) -> Self {
        Self { calendar }
    }

    /// Request for `count` candles as of the local clock.
    pub fn plan(&self, symbol: &str, resolution: Resolution, count: usize) -> CandleRequest {
        self.plan_at(symbol, resolution, count, &Local::now())
    }

    pub fn plan_at<Tz: TimeZone>(
        &self,
        symbol: &str,
        resolution: Resolution,
        count: usize,
        now: &DateTime<Tz>,
    ) -> CandleRequest {
        let wall_now = now.naive_local();
        let lookback_minutes = self.lookback_minutes_at(wall_now, resolution, count);
        let to = now.timestamp();
        // The walk counts wall-clock minutes, so the start is resolved as local wall time. Across
        // a DST change it is an hour away from `to - lookback_minutes`.
        let wall_from = wall_now - TimeDelta::minutes(lookback_minutes);
        let from = now
            .timezone()
            .from_local_datetime(&wall_from)
            .earliest()
            .map_or(to - lookback_minutes * TimeUtils::S_IN_MIN, |t| t.timestamp());
        let request = CandleRequest {
            symbol: symbol.to_string(),
            resolution,
            request_resolution: resolution.request_resolution(),
            from,
            to,
            lookback_minutes,
            required_candles: required_base_candles(resolution, count),
        };

        #[cfg(debug_assertions)]
        if DF.log_lookback {
            log::info!("Planned request: {}", request);
        }
        request
    }

    /// Open-market minutes a request for `count` candles has to cover. Intraday only.
    pub fn required_open_minutes(resolution: Resolution, count: usize) -> i64 {
        let padded = count as i64 + REQUEST_PADDING;
        match resolution {
            Resolution::Minute1 => padded + lookback::MINUTE_PADDING,
            Resolution::Minute10 => (padded + lookback::TEN_MINUTE_PADDING) * resolution.minutes(),
            _ => padded * resolution.minutes(),
        }
    }

    /// Wall-clock minutes to reach back from `now` (local wall time).
    pub fn lookback_minutes_at(
        &self,
        now: NaiveDateTime,
        resolution: Resolution,
        count: usize,
    ) -> i64 {
        let padded = count as i64 + REQUEST_PADDING;
        let day = TimeUtils::MIN_IN_D;
        match resolution {
            Resolution::Day => {
                (day as f64 * padded as f64 * lookback::DAILY_STRETCH
                    + (day * lookback::CALENDAR_SLACK) as f64) as i64
            }
            Resolution::Week => day * 7 * (padded + lookback::CALENDAR_SLACK),
            Resolution::Month => day * lookback::MONTH_DAYS * (padded + lookback::CALENDAR_SLACK),
            _ => self.walk_back(now, Self::required_open_minutes(resolution, count)),
        }
    }

    /// Wall-clock minutes before `now` that contain at least `required` open minutes.
    fn walk_back(&self, now: NaiveDateTime, required: i64) -> i64 {
        let open_at = self.calendar.open_minute;
        let close_at = self.calendar.close_minute;
        let passed = now.hour() as i64 * 60 + now.minute() as i64 + 1;

        let mut weekday = now.weekday();
        let mut closed;
        let mut open = 0;

        if is_weekend(weekday) || passed <= open_at {
            closed = passed;
        } else if passed <= close_at {
            closed = open_at;
            open = passed - closed - 2;
            if open > required {
                return required;
            }
        } else {
            closed = open_at + passed - close_at;
            open = self.calendar.open_span();
            if open > required {
                return required + closed - open_at;
            }
        }

        weekday = weekday.pred();
        while open < required {
            if is_weekend(weekday) {
                closed += TimeUtils::MIN_IN_D;
            } else {
                closed += self.calendar.closed_span();
                open += self.calendar.open_span();
            }
            weekday = weekday.pred();
        }

        let minutes = closed - open_at + required;

        #[cfg(debug_assertions)]
        if DF.log_lookback {
            log::info!(
                "walk_back: need {} open min, reach back {} from {}",
                required,
                format_duration_mins(minutes),
                now
            );
        }
        minutes
    }
}

impl Default for LookbackPlanner {
    fn default() -> Self {
        Self::new(crate::config::ENGINE.calendar)
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn required_minutes_per_resolution() {
        assert_eq!(LookbackPlanner::required_open_minutes(Resolution::Minute1, 90), 95);
        assert_eq!(LookbackPlanner::required_open_minutes(Resolution::Minute5, 90), 460);
        assert_eq!(LookbackPlanner::required_open_minutes(Resolution::Minute10, 90), 940);
        assert_eq!(LookbackPlanner::required_open_minutes(Resolution::Hour4, 90), 22_080);
    }

    #[test]
    fn open_session_with_enough_time_returns_required() {
        // Tuesday 2024-01-09 20:00, 719 open minutes so far
        let planner = LookbackPlanner::default();
        assert_eq!(planner.walk_back(at(2024, 1, 9, 20, 0), 500), 500);
    }

    #[test]
    fn after_close_skips_evening() {
        // Tuesday 23:00: passed 1381, evening closed part 61 minutes
        let planner = LookbackPlanner::default();
        assert_eq!(planner.walk_back(at(2024, 1, 9, 23, 0), 100), 161);
    }

    #[test]
    fn walk_crosses_weekend() {
        // Tuesday 10:00, 1000 open minutes needed
        let planner = LookbackPlanner::default();
        assert_eq!(planner.walk_back(at(2024, 1, 9, 10, 0), 1000), 5080);
    }

    #[test]
    fn calendar_resolutions_use_flat_multipliers() {
        let planner = LookbackPlanner::default();
        let now = at(2024, 1, 9, 10, 0);
        assert_eq!(
            planner.lookback_minutes_at(now, Resolution::Day, 90),
            (1440.0 * 92.0 * 1.4 + 1440.0 * 4.0) as i64
        );
        assert_eq!(planner.lookback_minutes_at(now, Resolution::Week, 90), 1440 * 7 * 96);
        assert_eq!(planner.lookback_minutes_at(now, Resolution::Month, 90), 1440 * 31 * 96);
    }

    #[test]
    fn request_targets_base_resolution() {
        let planner = LookbackPlanner::default();
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 9, 10, 0, 0).unwrap();
        let req = planner.plan_at("AAPL", Resolution::Minute10, 90, &now);
        assert_eq!(req.request_resolution, Resolution::Minute5);
        assert_eq!(req.required_candles, 182);
        assert_eq!(req.to, now.timestamp());
        assert_eq!(req.to - req.from, req.lookback_minutes * 60);
    }

    #[test]
    fn request_start_is_the_local_wall_time_the_walk_reached() {
        // Tuesday 10:00 at UTC+2 needs 95 open minutes, so the walk stops at 08:25 local
        let planner = LookbackPlanner::default();
        let tz = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 1, 9, 10, 0, 0).unwrap();
        let req = planner.plan_at("AAPL", Resolution::Minute1, 90, &now);
        assert_eq!(req.lookback_minutes, 95);
        let start = tz.with_ymd_and_hms(2024, 1, 9, 8, 25, 0).unwrap();
        assert_eq!(req.from, start.timestamp());
        assert_eq!(req.from, req.to - 95 * 60);
    }
}
