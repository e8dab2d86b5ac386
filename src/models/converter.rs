//! Merges base-resolution candles into derived-resolution candles (10 from 5, 240 from 60).

use crate::{
    config::Resolution,
    domain::Candle,
    engine::{EngineError, Result},
};

/// Builds exactly `window_size` candles of `derived`, oldest first, from `base` (oldest first).
///
/// Groups are formed walking backward from the newest base candle: consecutive base candles
/// whose timestamps fall into the same `derived` bucket are one group. A merged candle is
/// stamped with its derived bucket start, whether or not the group holds the bucket's leading
/// base candle. It takes the open of its first member, the close of its last, the extreme
/// high/low, and the summed volume. The newest group is the in-progress derived candle; if the
/// newest base candle starts a new bucket it seeds that candle alone.
pub fn merge(base: &[Candle], window_size: usize, derived: Resolution) -> Result<Vec<Candle>> {
    let mut groups: Vec<Candle> = Vec::with_capacity(window_size);
    let mut end = base.len();

    while end > 0 && groups.len() < window_size {
        let key = derived.bucket_start(base[end - 1].timestamp);
        let mut start = end - 1;
        while start > 0 && derived.bucket_start(base[start - 1].timestamp) == key {
            start -= 1;
        }

        let mut merged = base[start];
        for later in &base[start + 1..end] {
            merged.absorb(later);
        }
        merged.timestamp = key;
        groups.push(merged);
        end = start;
    }

    if groups.len() < window_size {
        return Err(EngineError::InsufficientHistory {
            required: window_size,
            available: groups.len(),
        });
    }

    groups.reverse();
    Ok(groups)
}

/// How many candles of the request resolution must be fetched for `count` candles of `resolution`.
pub fn required_base_candles(resolution: Resolution, count: usize) -> usize {
    match resolution {
        Resolution::Minute10 => count * 2 + 2,
        Resolution::Hour4 => count * 4,
        _ => count,
    }
}
