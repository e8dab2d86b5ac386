use {
    crate::{
        config::{ChartId, DF, Resolution},
        domain::{Candle, SeriesKey},
        engine::{EngineError, Result},
        models::{HistoricalOhlcv, converter},
        utils::{get_max, get_min},
    },
    std::collections::{BTreeSet, VecDeque},
};

/// Result of feeding one trade into a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The in-progress candle absorbed the trade.
    Updated,
    /// The in-progress candle was frozen and a new one opened. Carries the frozen candle.
    Rolled { closed: Candle },
}

/// Fixed-size rolling window of candles for one (symbol, resolution). The last candle is in progress.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    key: SeriesKey,
    candles: VecDeque<Candle>,
    chart_ids: BTreeSet<ChartId>,
}

impl CandleSeries {
    pub fn bootstrap(
        key: SeriesKey,
        history: &HistoricalOhlcv,
        window_size: usize,
    ) -> Result<Self> {
        let candles = Self::window_from_history(history, key.resolution, window_size)?;

        #[cfg(debug_assertions)]
        if DF.log_candle_update {
            log::info!(
                "Bootstrapped {} with {} candles (history had {})",
                key,
                candles.len(),
                history.len()
            );
        }

        Ok(Self {
            key,
            candles: candles.into(),
            chart_ids: BTreeSet::new(),
        })
    }

    /// The newest `count` candles of `resolution` built from `history`, merging when derived.
    pub fn window_from_history(
        history: &HistoricalOhlcv,
        resolution: Resolution,
        count: usize,
    ) -> Result<Vec<Candle>> {
        if count == 0 {
            return Err(EngineError::InvalidParameter(
                "window size must be positive".to_string(),
            ));
        }
        if !resolution.is_derived() {
            return history.last_candles(count);
        }

        history.validate()?;
        let required = converter::required_base_candles(resolution, count);
        if history.len() < required {
            return Err(EngineError::InsufficientHistory {
                required,
                available: history.len(),
            });
        }
        converter::merge(&history.candles(), count, resolution)
    }

    /// The newest `count` closes of candles that are already closed, oldest first.
    /// The in-progress (newest) candle of `history` is excluded.
    pub fn closed_closes(
        history: &HistoricalOhlcv,
        resolution: Resolution,
        count: usize,
    ) -> Result<Vec<f64>> {
        let window = Self::window_from_history(history, resolution, count + 1)?;
        Ok(window[..count].iter().map(|c| c.close).collect())
    }

    pub fn apply_tick(&mut self, price: f64, timestamp: i64, volume_delta: u64) -> TickOutcome {
        let resolution = self.key.resolution;
        let Some(last) = self.candles.back_mut() else {
            let opened = Candle::opening(resolution.bucket_start(timestamp), price, volume_delta);
            self.candles.push_back(opened);
            return TickOutcome::Updated;
        };

        let bucket_end = resolution.next_bucket_start(resolution.bucket_start(last.timestamp));
        if timestamp < bucket_end {
            last.apply_price(price, volume_delta);
            debug_assert!(last.is_consistent());
            return TickOutcome::Updated;
        }

        let closed = *last;
        self.candles.pop_front();
        self.candles.push_back(Candle::opening(
            resolution.bucket_start(timestamp),
            price,
            volume_delta,
        ));

        #[cfg(debug_assertions)]
        if DF.log_candle_update {
            log::info!(
                "{}: closed candle @ {} (c={}), opened @ {}",
                self.key,
                closed.timestamp,
                closed.close,
                resolution.bucket_start(timestamp)
            );
        }

        TickOutcome::Rolled { closed }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn symbol(&self) -> &str {
        &self.key.symbol
    }

    pub fn resolution(&self) -> Resolution {
        self.key.resolution
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }

    pub fn current_high(&self) -> Option<f64> {
        self.last_candle().map(|c| c.high)
    }

    pub fn current_low(&self) -> Option<f64> {
        self.last_candle().map(|c| c.low)
    }

    pub fn min_close(&self) -> Option<f64> {
        get_min(&self.closes())
    }

    pub fn max_close(&self) -> Option<f64> {
        get_max(&self.closes())
    }

    pub fn min_low(&self) -> Option<f64> {
        get_min(&self.lows())
    }

    pub fn max_high(&self) -> Option<f64> {
        get_max(&self.highs())
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.chart_ids.iter().copied()
    }

    pub fn has_chart(&self, chart_id: ChartId) -> bool {
        self.chart_ids.contains(&chart_id)
    }

    pub(crate) fn add_chart(&mut self, chart_id: ChartId) -> bool {
        self.chart_ids.insert(chart_id)
    }

    /// Returns true when no chart shares this series any more.
    pub(crate) fn remove_chart(&mut self, chart_id: ChartId) -> bool {
        self.chart_ids.remove(&chart_id);
        self.chart_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(res_secs: i64, closes: &[f64]) -> HistoricalOhlcv {
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * res_secs, c, c + 1.0, c - 1.0, c, 10))
            .collect();
        HistoricalOhlcv::from_candles(&candles)
    }

    fn series(closes: &[f64], window: usize) -> CandleSeries {
        CandleSeries::bootstrap(
            SeriesKey::new("TEST", Resolution::Minute1),
            &history(60, closes),
            window,
        )
        .unwrap()
    }

    #[test]
    fn bootstrap_keeps_newest_window() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(s.closes(), vec![3.0, 4.0, 5.0]);
        assert_eq!(s.timestamps(), vec![120, 180, 240]);
    }

    #[test]
    fn bootstrap_fails_without_enough_history() {
        let err = CandleSeries::bootstrap(
            SeriesKey::new("TEST", Resolution::Minute1),
            &history(60, &[1.0, 2.0]),
            3,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientHistory {
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn tick_inside_bucket_updates_in_progress_candle() {
        let mut s = series(&[1.0, 2.0, 3.0], 3);
        assert_eq!(s.apply_tick(9.0, 150, 4), TickOutcome::Updated);
        assert_eq!(s.apply_tick(0.5, 179, 1), TickOutcome::Updated);
        let last = s.last_candle().unwrap();
        assert_eq!(last.high, 9.0);
        assert_eq!(last.low, 0.5);
        assert_eq!(last.close, 0.5);
        assert_eq!(last.volume, 15);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn tick_past_bucket_end_rolls_over() {
        let mut s = series(&[1.0, 2.0, 3.0], 3);
        let outcome = s.apply_tick(7.0, 305, 2);
        let TickOutcome::Rolled { closed } = outcome else {
            panic!("expected roll-over, got {outcome:?}");
        };
        assert_eq!(closed.timestamp, 120);
        assert_eq!(closed.close, 3.0);
        assert_eq!(s.timestamps(), vec![60, 120, 300]);
        assert_eq!(s.last_candle(), Some(&Candle::opening(300, 7.0, 2)));
    }

    #[test]
    fn gaps_open_an_aligned_candle() {
        let mut s = series(&[1.0, 2.0, 3.0], 3);
        s.apply_tick(4.0, 3_725, 0);
        assert_eq!(s.last_candle().map(|c| c.timestamp), Some(3_720));
    }

    #[test]
    fn min_max_views() {
        let s = series(&[5.0, 2.0, 8.0, 3.0], 4);
        assert_eq!(s.min_close(), Some(2.0));
        assert_eq!(s.max_close(), Some(8.0));
        assert_eq!(s.min_low(), Some(1.0));
        assert_eq!(s.max_high(), Some(9.0));
        assert_eq!(s.current_high(), Some(4.0));
        assert_eq!(s.current_low(), Some(2.0));
    }

    #[test]
    fn closed_closes_exclude_in_progress() {
        let h = history(60, &[1.0, 2.0, 3.0, 4.0]);
        let closes = CandleSeries::closed_closes(&h, Resolution::Minute1, 2).unwrap();
        assert_eq!(closes, vec![2.0, 3.0]);
    }

    #[test]
    fn chart_membership() {
        let mut s = series(&[1.0, 2.0], 2);
        assert!(s.add_chart(ChartId::new(1)));
        assert!(!s.add_chart(ChartId::new(1)));
        s.add_chart(ChartId::new(2));
        assert!(!s.remove_chart(ChartId::new(1)));
        assert!(s.remove_chart(ChartId::new(2)));
    }
}
