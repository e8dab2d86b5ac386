use serde::{Deserialize, Serialize};

/// One OHLCV bucket. `timestamp` is the bucket start in seconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    pub volume: u64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Volumes arrive as floats on the wire; negative or non-finite values count as zero.
    #[inline]
    pub fn volume_from(v: f64) -> u64 {
        if v.is_finite() && v > 0.0 {
            v.round() as u64
        } else {
            0
        }
    }

    /// A fresh in-progress candle seeded by a single trade.
    pub fn opening(timestamp: i64, price: f64, volume: u64) -> Self {
        Self::new(timestamp, price, price, price, price, volume)
    }

    /// Folds one trade into the in-progress candle.
    #[inline]
    pub fn apply_price(&mut self, price: f64, volume_delta: u64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume = self.volume.saturating_add(volume_delta);
    }

    /// Folds the next candle of the same group into this one. `self` keeps its open and timestamp.
    #[inline]
    pub fn absorb(&mut self, later: &Candle) {
        self.high = self.high.max(later.high);
        self.low = self.low.min(later.low);
        self.close = later.close;
        self.volume = self.volume.saturating_add(later.volume);
    }

    /// `low <= open, close <= high`
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_price_widens_range_and_accumulates_volume() {
        let mut c = Candle::opening(600, 10.0, 5);
        c.apply_price(12.0, 3);
        c.apply_price(9.0, 2);
        c.apply_price(11.0, 0);
        assert_eq!(c, Candle::new(600, 10.0, 12.0, 9.0, 11.0, 10));
        assert!(c.is_consistent());
    }

    #[test]
    fn absorb_keeps_first_open_and_timestamp() {
        let mut first = Candle::new(0, 1.0, 1.5, 0.5, 1.2, 10);
        first.absorb(&Candle::new(300, 1.2, 2.0, 1.1, 1.8, 4));
        assert_eq!(first, Candle::new(0, 1.0, 2.0, 0.5, 1.8, 14));
    }
}
