use {
    crate::{
        config::{ChartId, DF, EngineConfig, Resolution},
        domain::{Candle, SeriesKey},
        engine::{AttachOutcome, DetachOutcome, EngineError, Result, StoreEvent, Tick},
        models::{
            AlarmBook, AlarmRecord, CandleSeries, HistoricalOhlcv, IndicatorPaint,
            IndicatorParams, IndicatorRegistry, TickOutcome,
        },
        utils::{AxisScale, TimeUtils, scale_axis},
    },
    std::collections::{BTreeMap, HashMap, VecDeque},
};

/// Everything the store knows about one watched symbol.
#[derive(Debug, Default)]
struct SymbolBook {
    last_price: Option<f64>,
    series: BTreeMap<Resolution, CandleSeries>,
}

/// Directory of candle series per symbol plus the indicators and alarms that hang off them.
/// All collaborators go through this type. It never blocks; callers wrap it in a mutex or keep
/// it on one thread.
#[derive(Debug)]
pub struct MarketDataStore {
    config: EngineConfig,
    symbols: BTreeMap<String, SymbolBook>,
    charts: HashMap<ChartId, SeriesKey>,
    indicators: IndicatorRegistry,
    alarms: AlarmBook,
    events: VecDeque<StoreEvent>,
}

impl MarketDataStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            symbols: BTreeMap::new(),
            charts: HashMap::new(),
            indicators: IndicatorRegistry::new(config),
            alarms: AlarmBook::new(),
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---------------------------------------------------------------- charts

    /// Puts a chart on (symbol, resolution). `history` is only read when the series does not
    /// exist yet.
    pub fn attach(
        &mut self,
        chart_id: ChartId,
        symbol: &str,
        resolution: Resolution,
        history: Option<&HistoricalOhlcv>,
    ) -> Result<AttachOutcome> {
        if self.charts.contains_key(&chart_id) {
            return Err(EngineError::ChartAlreadyAttached(chart_id));
        }
        let subscribe = !self.is_watched(symbol);
        let key = SeriesKey::new(symbol, resolution);

        let series_created = match self.prepare_series(&key, history)? {
            Some(series) => {
                self.insert_series(series);
                true
            }
            None => false,
        };
        self.link_chart(chart_id, key);

        Ok(AttachOutcome {
            series_created,
            subscribe,
        })
    }

    pub fn detach(&mut self, chart_id: ChartId) -> Result<DetachOutcome> {
        let key = self
            .charts
            .get(&chart_id)
            .cloned()
            .ok_or(EngineError::ChartNotFound(chart_id))?;

        let indicators = self.indicators.remove_chart(chart_id);
        let series_removed = self.unlink_chart(chart_id);
        let symbol_removed = self
            .symbols
            .get(&key.symbol)
            .is_none_or(|book| book.series.is_empty());
        let unsubscribe = self.release_symbol_if_unwatched(&key.symbol);

        #[cfg(debug_assertions)]
        if DF.log_store {
            log::info!(
                "{} detached from {} (series removed: {}, unsubscribe: {})",
                chart_id,
                key,
                series_removed,
                unsubscribe
            );
        }

        Ok(DetachOutcome {
            series_removed,
            symbol_removed,
            unsubscribe,
            indicators,
        })
    }

    /// Moves a chart to another resolution of the same symbol and rebuilds its indicators with
    /// their current parameters. Nothing changes if any step would fail.
    pub fn switch_resolution(
        &mut self,
        chart_id: ChartId,
        resolution: Resolution,
        history: Option<&HistoricalOhlcv>,
    ) -> Result<AttachOutcome> {
        let key = self.chart_key(chart_id)?.clone();
        if key.resolution == resolution {
            return Ok(AttachOutcome {
                series_created: false,
                subscribe: false,
            });
        }
        let target = SeriesKey::new(key.symbol.clone(), resolution);
        let params = self.indicators.params(chart_id);

        let new_series = self.prepare_series(&target, history)?;
        let closes = match params.iter().map(|p| p.period().value()).max() {
            Some(max_period) => {
                let history = history.ok_or_else(|| EngineError::HistoryRequired {
                    symbol: target.symbol.clone(),
                    resolution,
                })?;
                let count = self.config.window_size + max_period - 1;
                Some(CandleSeries::closed_closes(history, resolution, count)?)
            }
            None => None,
        };

        self.indicators.remove_chart(chart_id);
        self.unlink_chart(chart_id);
        let series_created = new_series.is_some();
        if let Some(series) = new_series {
            self.insert_series(series);
        }
        self.link_chart(chart_id, target);
        if let Some(closes) = closes {
            self.indicators.restore(chart_id, &params, &closes)?;
        }

        Ok(AttachOutcome {
            series_created,
            subscribe: false,
        })
    }

    // ---------------------------------------------------------------- live feed

    /// Routes one trade to every series of its symbol. Returns how many series rolled over.
    /// Trades for symbols nobody watches are dropped.
    pub fn tick(&mut self, tick: &Tick) -> usize {
        let Some(book) = self.symbols.get_mut(&tick.symbol) else {
            return 0;
        };
        book.last_price = Some(tick.price);

        let ts = TimeUtils::ms_to_secs(tick.timestamp_ms);
        let volume = Candle::volume_from(tick.volume);

        let mut closed: Vec<(Resolution, Candle, Vec<ChartId>)> = Vec::new();
        for (resolution, series) in book.series.iter_mut() {
            if let TickOutcome::Rolled { closed: candle } =
                series.apply_tick(tick.price, ts, volume)
            {
                closed.push((*resolution, candle, series.chart_ids().collect()));
            }
        }

        // Indicators first, listeners after.
        for (resolution, candle, charts) in &closed {
            for chart_id in charts {
                if let Err(e) = self.indicators.on_candle_closed(*chart_id, candle.close) {
                    log::error!(
                        "{} ({} {}): indicator update failed: {}",
                        chart_id,
                        tick.symbol,
                        resolution,
                        e
                    );
                }
            }
        }

        let rolled = closed.len();
        for (resolution, candle, charts) in closed {
            self.events.push_back(StoreEvent::CandleClosed {
                symbol: tick.symbol.clone(),
                resolution,
                candle,
                charts,
            });
        }
        self.events.push_back(StoreEvent::PriceChanged {
            symbol: tick.symbol.clone(),
            price: tick.price,
        });

        for fired in self.alarms.check(&tick.symbol, tick.price) {
            self.events.push_back(StoreEvent::AlarmTriggered {
                symbol: fired.symbol,
                threshold: fired.threshold,
                direction: fired.direction,
                price: tick.price,
            });
        }
        self.release_symbol_if_unwatched(&tick.symbol);

        rolled
    }

    /// Queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        self.events.drain(..).collect()
    }

    // ---------------------------------------------------------------- indicators

    /// Adds an indicator to a chart, bootstrapped from `history` of the chart's resolution
    /// (its request resolution for derived ones). Returns `Ok(false)` for a duplicate.
    pub fn add_indicator(
        &mut self,
        chart_id: ChartId,
        params: IndicatorParams,
        history: &HistoricalOhlcv,
    ) -> Result<bool> {
        params.validate(&self.config)?;
        let key = self.chart_key(chart_id)?.clone();
        let count = self.indicators.required_closes(&params);
        let closes = CandleSeries::closed_closes(history, key.resolution, count)?;
        self.warn_if_stale(&key, history);
        self.indicators.add(chart_id, params, &closes)
    }

    pub fn remove_indicator(
        &mut self,
        chart_id: ChartId,
        params: &IndicatorParams,
    ) -> Result<bool> {
        self.chart_key(chart_id)?;
        Ok(self.indicators.remove(chart_id, params))
    }

    /// Re-creates persisted indicators. Every entry is validated before any is added.
    pub fn restore_indicators(
        &mut self,
        chart_id: ChartId,
        params: &[IndicatorParams],
        history: &HistoricalOhlcv,
    ) -> Result<usize> {
        for p in params {
            p.validate(&self.config)?;
        }
        let key = self.chart_key(chart_id)?.clone();
        let Some(max_period) = params.iter().map(|p| p.period().value()).max() else {
            return Ok(0);
        };
        let count = self.config.window_size + max_period - 1;
        let closes = CandleSeries::closed_closes(history, key.resolution, count)?;
        self.warn_if_stale(&key, history);
        self.indicators.restore(chart_id, params, &closes)
    }

    /// Persistence view of a chart's indicators.
    pub fn indicator_params(&self, chart_id: ChartId) -> Result<Vec<IndicatorParams>> {
        self.chart_key(chart_id)?;
        Ok(self.indicators.params(chart_id))
    }

    /// Indicator lines of a chart keyed by legend label.
    pub fn indicator_paint(&self, chart_id: ChartId) -> Result<BTreeMap<String, IndicatorPaint>> {
        self.chart_key(chart_id)?;
        Ok(self
            .indicators
            .paint(chart_id)
            .into_iter()
            .map(|p| (p.label.clone(), p))
            .collect())
    }

    // ---------------------------------------------------------------- alarms

    /// Arms an alarm relative to `current_price`. Returns false for a duplicate threshold.
    pub fn add_alarm(&mut self, symbol: &str, threshold: f64, current_price: f64) -> bool {
        let book = self.symbols.entry(symbol.to_string()).or_default();
        book.last_price.get_or_insert(current_price);
        let added = self.alarms.add(symbol, threshold, current_price);
        self.release_symbol_if_unwatched(symbol);
        added
    }

    pub fn remove_alarm(&mut self, symbol: &str, threshold: f64) -> bool {
        let removed = self.alarms.remove(symbol, threshold);
        self.release_symbol_if_unwatched(symbol);
        removed
    }

    pub fn alarm_thresholds(&self, symbol: &str) -> Vec<f64> {
        self.alarms.thresholds(symbol)
    }

    pub fn alarm_records(&self) -> Vec<AlarmRecord> {
        self.alarms.records()
    }

    pub fn restore_alarms(&mut self, records: &[AlarmRecord]) {
        for r in records {
            self.symbols.entry(r.symbol.clone()).or_default();
        }
        self.alarms.restore(records);
    }

    // ---------------------------------------------------------------- reads

    /// A series or an alarm keeps the symbol's live feed alive.
    pub fn is_watched(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.symbols.get(symbol)?.last_price
    }

    pub fn chart_key(&self, chart_id: ChartId) -> Result<&SeriesKey> {
        self.charts
            .get(&chart_id)
            .ok_or(EngineError::ChartNotFound(chart_id))
    }

    pub fn chart_series(&self, chart_id: ChartId) -> Result<&CandleSeries> {
        let key = self.chart_key(chart_id)?;
        self.series(&key.symbol, key.resolution)
    }

    pub fn series(&self, symbol: &str, resolution: Resolution) -> Result<&CandleSeries> {
        self.symbols
            .get(symbol)
            .and_then(|b| b.series.get(&resolution))
            .ok_or_else(|| EngineError::SeriesNotFound {
                symbol: symbol.to_string(),
                resolution,
            })
    }

    pub fn all_closes(&self, symbol: &str, resolution: Resolution) -> Result<Vec<f64>> {
        Ok(self.series(symbol, resolution)?.closes())
    }

    pub fn all_highs(&self, symbol: &str, resolution: Resolution) -> Result<Vec<f64>> {
        Ok(self.series(symbol, resolution)?.highs())
    }

    pub fn all_lows(&self, symbol: &str, resolution: Resolution) -> Result<Vec<f64>> {
        Ok(self.series(symbol, resolution)?.lows())
    }

    pub fn all_opens(&self, symbol: &str, resolution: Resolution) -> Result<Vec<f64>> {
        Ok(self.series(symbol, resolution)?.opens())
    }

    pub fn all_timestamps(&self, symbol: &str, resolution: Resolution) -> Result<Vec<i64>> {
        Ok(self.series(symbol, resolution)?.timestamps())
    }

    pub fn current_high(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.current_high())
    }

    pub fn current_low(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.current_low())
    }

    pub fn min_close(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.min_close())
    }

    pub fn max_close(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.max_close())
    }

    pub fn min_low(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.min_low())
    }

    pub fn max_high(&self, symbol: &str, resolution: Resolution) -> Result<Option<f64>> {
        Ok(self.series(symbol, resolution)?.max_high())
    }

    /// Price axis labels spanning the series' closes.
    pub fn axis_scale(&self, symbol: &str, resolution: Resolution) -> Result<Option<AxisScale>> {
        let series = self.series(symbol, resolution)?;
        Ok(series
            .min_close()
            .zip(series.max_close())
            .map(|(min, max)| scale_axis(min, max)))
    }

    // ---------------------------------------------------------------- internals

    /// A freshly bootstrapped series for `key`, or `None` if it already exists.
    fn prepare_series(
        &self,
        key: &SeriesKey,
        history: Option<&HistoricalOhlcv>,
    ) -> Result<Option<CandleSeries>> {
        if self.series(&key.symbol, key.resolution).is_ok() {
            return Ok(None);
        }
        let history = history.ok_or_else(|| EngineError::HistoryRequired {
            symbol: key.symbol.clone(),
            resolution: key.resolution,
        })?;
        let series = crate::trace_time!("Series bootstrap", 2_000, {
            CandleSeries::bootstrap(key.clone(), history, self.config.window_size)
        })?;
        Ok(Some(series))
    }

    fn insert_series(&mut self, series: CandleSeries) {
        #[cfg(debug_assertions)]
        if DF.log_store {
            log::info!("New series {} ({} candles)", series.key(), series.len());
        }
        let key = series.key().clone();
        self.symbols
            .entry(key.symbol)
            .or_default()
            .series
            .insert(key.resolution, series);
    }

    fn link_chart(&mut self, chart_id: ChartId, key: SeriesKey) {
        if let Some(series) = self
            .symbols
            .get_mut(&key.symbol)
            .and_then(|b| b.series.get_mut(&key.resolution))
        {
            series.add_chart(chart_id);
        }
        self.charts.insert(chart_id, key);
    }

    /// Returns true when the chart was the last one on its series (which is then dropped).
    fn unlink_chart(&mut self, chart_id: ChartId) -> bool {
        let Some(key) = self.charts.remove(&chart_id) else {
            return false;
        };
        let Some(book) = self.symbols.get_mut(&key.symbol) else {
            return false;
        };
        let emptied = book
            .series
            .get_mut(&key.resolution)
            .is_some_and(|s| s.remove_chart(chart_id));
        if emptied {
            book.series.remove(&key.resolution);
        }
        emptied
    }

    /// Drops the symbol when neither a series nor an alarm needs its prices.
    fn release_symbol_if_unwatched(&mut self, symbol: &str) -> bool {
        let unwatched = self
            .symbols
            .get(symbol)
            .is_some_and(|b| b.series.is_empty())
            && !self.alarms.has_symbol(symbol);
        if unwatched {
            self.symbols.remove(symbol);
        }
        !self.symbols.contains_key(symbol)
    }

    fn warn_if_stale(&self, key: &SeriesKey, history: &HistoricalOhlcv) {
        let Ok(series) = self.series(&key.symbol, key.resolution) else {
            return;
        };
        let live = series.last_candle().map(|c| key.resolution.bucket_start(c.timestamp));
        let fetched = history
            .timestamps
            .last()
            .map(|&t| key.resolution.bucket_start(t));
        if live != fetched {
            log::warn!(
                "{}: history ends in bucket {:?} but the live series is at {:?}",
                key,
                fetched,
                live
            );
        }
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
