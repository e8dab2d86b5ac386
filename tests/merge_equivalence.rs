//! A derived series bootstrapped cold from base history must match one bootstrapped earlier
//! and then driven by live trades over the same base candles.

use chart_engine::{
    Candle, HistoricalOhlcv, Resolution, SeriesKey,
    models::{CandleSeries, TickOutcome},
};

/// Multiple of both 600 and 14_400 seconds.
const T0: i64 = 1_700_006_400;
const WINDOW: usize = 20;

struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn base_candles(count: usize, step: i64, seed: u64) -> Vec<Candle> {
    let timestamps: Vec<i64> = (0..count).map(|i| T0 + i as i64 * step).collect();
    candles_at(&timestamps, seed)
}

/// Weekday-style sessions from 08:00 to 22:00 UTC. Odd days open one base candle late, and
/// every eleventh base slot has no trades, so some derived buckets lose their leading member.
fn session_candles(days: i64, step: i64, seed: u64) -> Vec<Candle> {
    let day0 = T0 - T0 % 86_400;
    let timestamps: Vec<i64> = (0..days)
        .flat_map(|d| {
            let open = day0 + d * 86_400 + 8 * 3600 + (d % 2) * step;
            let close = day0 + d * 86_400 + 22 * 3600;
            (open..close).step_by(step as usize)
        })
        .filter(|ts| (ts / step) % 11 != 0)
        .collect();
    candles_at(&timestamps, seed)
}

fn candles_at(timestamps: &[i64], seed: u64) -> Vec<Candle> {
    let mut rng = Lcg(seed);
    let mut price = 100.0;
    timestamps
        .iter()
        .map(|&ts| {
            let open = price;
            let close = open + (rng.next_f64() - 0.5) * 2.0;
            let high = open.max(close) + rng.next_f64();
            let low = open.min(close) - rng.next_f64();
            price = close;
            let volume = (rng.next_f64() * 1000.0) as u64 + 1;
            Candle::new(ts, open, high, low, close, volume)
        })
        .collect()
}

/// Replays one base candle as four trades inside its bucket. Returns how many roll-overs happened.
fn replay(series: &mut CandleSeries, c: &Candle, step: i64) -> usize {
    let q = step / 4;
    [
        (c.open, c.timestamp, c.volume),
        (c.high, c.timestamp + q, 0),
        (c.low, c.timestamp + 2 * q, 0),
        (c.close, c.timestamp + 3 * q, 0),
    ]
    .into_iter()
    .filter(|&(price, ts, vol)| {
        matches!(series.apply_tick(price, ts, vol), TickOutcome::Rolled { .. })
    })
    .count()
}

fn step_of(derived: Resolution) -> (i64, usize) {
    let (base_res, factor) = derived.derivation().unwrap();
    (base_res.bucket_secs(), factor)
}

fn check_equivalence(derived: Resolution, base: &[Candle]) {
    let (step, factor) = step_of(derived);
    let bucket = derived.bucket_secs();
    let key = SeriesKey::new("EQV", derived);

    let first_prefix = factor * WINDOW + 2;
    for prefix in first_prefix..first_prefix + factor {
        let history = HistoricalOhlcv::from_candles(&base[..prefix]);
        let mut warm = CandleSeries::bootstrap(key.clone(), &history, WINDOW).unwrap();

        let mut rolled = 0;
        for k in prefix..base.len() {
            rolled += replay(&mut warm, &base[k], step);

            let cold = CandleSeries::bootstrap(
                key.clone(),
                &HistoricalOhlcv::from_candles(&base[..=k]),
                WINDOW,
            )
            .unwrap();
            assert_eq!(warm.len(), WINDOW);
            let warm_candles: Vec<Candle> = warm.candles().copied().collect();
            let cold_candles: Vec<Candle> = cold.candles().copied().collect();
            assert_eq!(
                warm_candles, cold_candles,
                "{} diverged after base candle {} (prefix {})",
                derived, k, prefix
            );
            for c in &warm_candles {
                assert_eq!(c.timestamp % bucket, 0, "{} off grid: {:?}", derived, c);
            }
        }
        let new_buckets = base[prefix - 1..]
            .windows(2)
            .filter(|w| {
                derived.bucket_start(w[0].timestamp) != derived.bucket_start(w[1].timestamp)
            })
            .count();
        assert_eq!(rolled, new_buckets);
    }
}

#[test]
fn ten_minute_from_five_minute() {
    let (step, _) = step_of(Resolution::Minute10);
    check_equivalence(Resolution::Minute10, &base_candles(100, step, 7));
}

#[test]
fn four_hour_from_one_hour() {
    let (step, _) = step_of(Resolution::Hour4);
    check_equivalence(Resolution::Hour4, &base_candles(140, step, 11));
}

#[test]
fn ten_minute_from_five_minute_sessions_with_gaps() {
    let (step, _) = step_of(Resolution::Minute10);
    let base = session_candles(3, step, 23);
    // Odd days open at 08:05, inside the 08:00 bucket.
    assert!(base.iter().any(|c| c.timestamp % 86_400 == 8 * 3600 + 300));
    check_equivalence(Resolution::Minute10, &base);
}

#[test]
fn four_hour_from_one_hour_sessions_with_gaps() {
    let (step, _) = step_of(Resolution::Hour4);
    let base = session_candles(14, step, 29);
    assert!(base.iter().any(|c| c.timestamp % 86_400 == 9 * 3600));
    check_equivalence(Resolution::Hour4, &base);
}

#[test]
fn cold_bootstrap_over_gaps_stays_on_the_bucket_grid() {
    let (step, _) = step_of(Resolution::Minute10);
    let day1_open = T0 - T0 % 86_400 + 86_400 + 8 * 3600;
    let base: Vec<Candle> = session_candles(2, step, 31)
        .into_iter()
        .take_while(|c| c.timestamp < day1_open + 5 * 600)
        .collect();
    // The day opens at 08:05, so the 08:00 bucket has no leading member.
    let first_of_day1 = base.iter().find(|c| c.timestamp >= day1_open).unwrap();
    assert_eq!(first_of_day1.timestamp, day1_open + 300);
    let history = HistoricalOhlcv::from_candles(&base);
    let series =
        CandleSeries::bootstrap(SeriesKey::new("GAP", Resolution::Minute10), &history, WINDOW)
            .unwrap();
    assert!(series.candles().any(|c| c.timestamp == day1_open));
    assert!(series.candles().all(|c| c.timestamp % 600 == 0));
}

#[test]
fn first_ten_minute_candle_takes_first_open() {
    let candles: Vec<Candle> = [1.0, 2.0, 3.0, 4.0]
        .iter()
        .enumerate()
        .map(|(i, &p)| Candle::new(T0 + i as i64 * 300, p, p, p, p, 1))
        .collect();
    let merged = chart_engine::models::converter::merge(&candles, 2, Resolution::Minute10).unwrap();
    assert_eq!(merged[0].open, 1.0);
    assert_eq!(merged[0].close, 2.0);
    assert_eq!(merged[0].timestamp, T0);
    assert_eq!(merged[1].open, 3.0);
    assert_eq!(merged[1].volume, 2);
}
