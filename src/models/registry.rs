use {
    crate::{
        config::{ChartId, DF, EngineConfig},
        engine::{EngineError, Result},
        models::{
            CloseWindow,
            indicators::{IndicatorKind, IndicatorPaint, IndicatorParams, IndicatorSeries},
        },
    },
    std::collections::{BTreeMap, HashMap},
};

/// Index of a close window in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

#[derive(Debug, Clone)]
struct RegistryEntry {
    window: WindowHandle,
    series: Vec<IndicatorSeries>,
}

/// (kind, chart) -> indicators. Every chart with at least one indicator owns one close window
/// in the arena; its indicators read it by handle.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    config: EngineConfig,
    windows: Vec<Option<CloseWindow>>,
    free: Vec<usize>,
    chart_windows: HashMap<ChartId, WindowHandle>,
    entries: BTreeMap<(IndicatorKind, ChartId), RegistryEntry>,
}

impl IndicatorRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            windows: Vec::new(),
            free: Vec::new(),
            chart_windows: HashMap::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Closed closes needed to bootstrap `params`.
    pub fn required_closes(&self, params: &IndicatorParams) -> usize {
        self.config.window_size + params.period().value() - 1
    }

    /// Adds one indicator bootstrapped from `closes` (closed candles only, oldest first).
    /// Returns `Ok(false)` when an identical indicator already exists on the chart.
    pub fn add(
        &mut self,
        chart_id: ChartId,
        params: IndicatorParams,
        closes: &[f64],
    ) -> Result<bool> {
        params.validate(&self.config)?;
        if self.contains(chart_id, &params) {
            return Ok(false);
        }

        let series = IndicatorSeries::bootstrap(params, closes, self.config.window_size)?;
        let period = params.period().value();

        let handle = match self.chart_windows.get(&chart_id).copied() {
            Some(handle) => {
                if let Some(window) = self.window_mut(handle) {
                    if window.capacity() < period {
                        *window = CloseWindow::from_closes(closes, period);
                    }
                }
                handle
            }
            None => {
                let handle = self.alloc_window(CloseWindow::from_closes(closes, period));
                self.chart_windows.insert(chart_id, handle);
                handle
            }
        };

        self.entries
            .entry((params.kind(), chart_id))
            .or_insert_with(|| RegistryEntry {
                window: handle,
                series: Vec::new(),
            })
            .series
            .push(series);

        #[cfg(debug_assertions)]
        if DF.log_indicator_update {
            log::info!("{}: added {} from {} closes", chart_id, params.label(), closes.len());
        }
        Ok(true)
    }

    /// Validates every entry before adding any. Returns how many were new.
    pub fn restore(
        &mut self,
        chart_id: ChartId,
        params: &[IndicatorParams],
        closes: &[f64],
    ) -> Result<usize> {
        for p in params {
            p.validate(&self.config)?;
            let required = self.required_closes(p);
            if closes.len() < required {
                return Err(EngineError::InsufficientHistory {
                    required,
                    available: closes.len(),
                });
            }
        }
        let mut added = 0;
        for p in params {
            if self.add(chart_id, *p, closes)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Returns true when the indicator existed.
    pub fn remove(&mut self, chart_id: ChartId, params: &IndicatorParams) -> bool {
        let key = (params.kind(), chart_id);
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        let before = entry.series.len();
        entry.series.retain(|s| s.params() != *params);
        let removed = entry.series.len() != before;
        if entry.series.is_empty() {
            self.entries.remove(&key);
        }
        if removed {
            self.release_or_shrink(chart_id);
        }
        removed
    }

    /// Drops every indicator of the chart and its close window. Returns what was removed.
    pub fn remove_chart(&mut self, chart_id: ChartId) -> Vec<IndicatorParams> {
        let removed = self.params(chart_id);
        self.entries.retain(|(_, id), _| *id != chart_id);
        self.release_or_shrink(chart_id);
        removed
    }

    /// One roll-over of the chart's series: every indicator first, then the shared window.
    pub fn on_candle_closed(&mut self, chart_id: ChartId, close: f64) -> Result<()> {
        let Some(handle) = self.chart_windows.get(&chart_id).copied() else {
            return Ok(());
        };

        for ((_, id), entry) in self.entries.iter_mut() {
            if *id != chart_id {
                continue;
            }
            let Some(Some(window)) = self.windows.get(entry.window.0) else {
                continue;
            };
            for series in entry.series.iter_mut() {
                series.update(window, close)?;
            }
        }
        if let Some(window) = self.window_mut(handle) {
            window.push(close);
        }

        #[cfg(debug_assertions)]
        if DF.log_indicator_update {
            log::info!("{}: indicators advanced with close {}", chart_id, close);
        }
        Ok(())
    }

    pub fn contains(&self, chart_id: ChartId, params: &IndicatorParams) -> bool {
        self.entries
            .get(&(params.kind(), chart_id))
            .is_some_and(|e| e.series.iter().any(|s| s.params() == *params))
    }

    pub fn has_chart(&self, chart_id: ChartId) -> bool {
        self.chart_windows.contains_key(&chart_id)
    }

    /// Parameters of the chart's indicators, averages first, in insertion order.
    pub fn params(&self, chart_id: ChartId) -> Vec<IndicatorParams> {
        self.chart_series(chart_id).map(|s| s.params()).collect()
    }

    pub fn paint(&self, chart_id: ChartId) -> Vec<IndicatorPaint> {
        self.chart_series(chart_id).map(|s| s.paint()).collect()
    }

    pub fn max_period(&self, chart_id: ChartId) -> Option<usize> {
        self.chart_series(chart_id).map(|s| s.period().value()).max()
    }

    pub fn window(&self, chart_id: ChartId) -> Option<&CloseWindow> {
        let handle = self.chart_windows.get(&chart_id)?;
        self.windows.get(handle.0)?.as_ref()
    }

    /// Live close windows in the arena.
    pub fn window_count(&self) -> usize {
        self.windows.iter().filter(|w| w.is_some()).count()
    }

    fn chart_series(&self, chart_id: ChartId) -> impl Iterator<Item = &IndicatorSeries> {
        self.entries
            .iter()
            .filter(move |((_, id), _)| *id == chart_id)
            .flat_map(|(_, entry)| entry.series.iter())
    }

    fn window_mut(&mut self, handle: WindowHandle) -> Option<&mut CloseWindow> {
        self.windows.get_mut(handle.0)?.as_mut()
    }

    fn alloc_window(&mut self, window: CloseWindow) -> WindowHandle {
        match self.free.pop() {
            Some(slot) => {
                self.windows[slot] = Some(window);
                WindowHandle(slot)
            }
            None => {
                self.windows.push(Some(window));
                WindowHandle(self.windows.len() - 1)
            }
        }
    }

    fn release_or_shrink(&mut self, chart_id: ChartId) {
        let Some(handle) = self.chart_windows.get(&chart_id).copied() else {
            return;
        };
        match self.max_period(chart_id) {
            Some(period) => {
                if let Some(window) = self.window_mut(handle) {
                    window.shrink_to(period);
                }
            }
            None => {
                self.chart_windows.remove(&chart_id);
                if let Some(slot) = self.windows.get_mut(handle.0) {
                    *slot = None;
                    self.free.push(handle.0);
                }
            }
        }
    }
}
