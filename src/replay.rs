//! Replays recorded trades through a store with one chart, for inspecting candle roll-overs,
//! indicator points and alarms without a live feed.

use {
    crate::{
        Cli,
        config::{ChartId, EngineConfig},
        domain::Candle,
        data::{JsonFileProvider, LookbackPlanner, MarketDataProvider, indicator_history_count},
        engine::{MarketDataStore, StoreEvent, Tick},
        utils::{TimeUtils, epoch_sec_to_utc, round_price},
    },
    anyhow::{Context, Result},
    chrono::DateTime,
    tabled::Tabled,
};

const REPLAY_CHART: ChartId = ChartId::new(1);
const SERIES_TAIL: usize = 10;

#[derive(Debug, Clone, Tabled)]
pub struct CandleRow {
    #[tabled(rename = "Bucket (UTC)")]
    pub bucket: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        Self {
            bucket: epoch_sec_to_utc(candle.timestamp),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct AlarmRow {
    #[tabled(rename = "Time (UTC)")]
    pub time: String,
    pub threshold: f64,
    pub direction: String,
    pub price: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct IndicatorRow {
    pub indicator: String,
    pub line: usize,
    pub points: usize,
    pub latest: String,
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    pub request: String,
    pub ticks: usize,
    pub closed: Vec<CandleRow>,
    /// Newest candles of the chart's series after the last trade, in-progress one last.
    pub series: Vec<CandleRow>,
    pub alarms: Vec<AlarmRow>,
    pub indicators: Vec<IndicatorRow>,
}

/// Fetches history for the chart, attaches it with its indicators and alarms, then feeds
/// every recorded trade in order.
pub async fn run(args: &Cli) -> Result<ReplayReport> {
    let config = EngineConfig {
        window_size: args.window,
        ..EngineConfig::default()
    };
    let params = args.indicator_params(&config)?;

    let ticks: Vec<Tick> = match &args.ticks {
        Some(path) => crate::data::read_tick_log(path).await?,
        None => Vec::new(),
    };

    let count = params
        .iter()
        .map(|p| indicator_history_count(config.window_size, p.period().value()))
        .max()
        .unwrap_or(config.window_size)
        .max(config.window_size);
    let planner = LookbackPlanner::new(config.calendar);
    let as_of = args
        .at
        .or_else(|| ticks.first().map(|t| TimeUtils::ms_to_secs(t.timestamp_ms)));
    let request = match as_of {
        Some(secs) => {
            let at = DateTime::from_timestamp(secs, 0)
                .with_context(|| format!("timestamp {} out of range", secs))?;
            planner.plan_at(&args.symbol, args.resolution, count, &at)
        }
        None => planner.plan(&args.symbol, args.resolution, count),
    };
    log::info!("Planned {}", request);

    let provider = JsonFileProvider::new(&args.history_dir);
    let history = provider.fetch_history(&request).await?;

    let mut store = MarketDataStore::new(config);
    let attached = store.attach(REPLAY_CHART, &args.symbol, args.resolution, Some(&history))?;
    log::info!(
        "{} on {} (subscribe: {})",
        REPLAY_CHART,
        store.chart_key(REPLAY_CHART)?,
        attached.subscribe
    );
    if !params.is_empty() {
        let added = store.restore_indicators(REPLAY_CHART, &params, &history)?;
        log::info!("{} indicator(s) bootstrapped", added);
    }
    if let Some(&last_close) = history.close.last() {
        for &threshold in &args.alarms {
            if !store.add_alarm(&args.symbol, threshold, last_close) {
                log::warn!("Duplicate alarm {} ignored", threshold);
            }
        }
    }

    let mut report = ReplayReport {
        request: request.to_string(),
        ..Default::default()
    };
    for tick in ticks.iter().filter(|t| t.symbol == args.symbol) {
        store.tick(tick);
        report.ticks += 1;
        let secs = TimeUtils::ms_to_secs(tick.timestamp_ms);
        for event in store.drain_events() {
            match event {
                StoreEvent::CandleClosed { candle, .. } => {
                    report.closed.push(CandleRow::from(&candle))
                }
                StoreEvent::AlarmTriggered {
                    threshold,
                    direction,
                    price,
                    ..
                } => report.alarms.push(AlarmRow {
                    time: epoch_sec_to_utc(secs),
                    threshold,
                    direction: format!("{:?}", direction),
                    price,
                }),
                StoreEvent::PriceChanged { .. } => {}
            }
        }
    }

    let series = store.chart_series(REPLAY_CHART)?;
    report.series = series
        .candles()
        .skip(series.len().saturating_sub(SERIES_TAIL))
        .map(CandleRow::from)
        .collect();

    for (label, paint) in store.indicator_paint(REPLAY_CHART)? {
        for (line, points) in paint.lines.iter().enumerate() {
            report.indicators.push(IndicatorRow {
                indicator: label.clone(),
                line,
                points: points.len(),
                latest: points
                    .last()
                    .map(|&v| round_price(v).to_string())
                    .unwrap_or_else(|| "-".to_string()),
            });
        }
    }

    Ok(report)
}
