use {
    crate::{
        config::{BandFactor, Period},
        engine::{EngineError, Result},
    },
    std::collections::VecDeque,
};

/// Bollinger bands over closed candles from rolling sums of closes (`s1`) and squared closes (`s2`).
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    period: Period,
    factor: BandFactor,
    s1: f64,
    s2: f64,
    upper: VecDeque<f64>,
    lower: VecDeque<f64>,
    capacity: usize,
}

impl BollingerBands {
    pub fn bootstrap(
        period: Period,
        factor: BandFactor,
        closes: &[f64],
        points: usize,
    ) -> Result<Self> {
        let p = period.value();
        if p == 0 || points == 0 {
            return Err(EngineError::InvalidParameter(format!(
                "period {} and point count {} must be positive",
                p, points
            )));
        }
        let required = points + p - 1;
        if closes.len() < required {
            return Err(EngineError::InsufficientHistory {
                required,
                available: closes.len(),
            });
        }
        let data = &closes[closes.len() - required..];

        let mut bands = Self {
            period,
            factor,
            s1: data[..p].iter().sum(),
            s2: data[..p].iter().map(|c| c * c).sum(),
            upper: VecDeque::with_capacity(points),
            lower: VecDeque::with_capacity(points),
            capacity: points,
        };
        bands.push_point();
        for i in p..data.len() {
            bands.slide(data[i], data[i - p]);
        }
        Ok(bands)
    }

    #[inline]
    pub fn update(&mut self, new_close: f64, dropped: f64) {
        self.slide(new_close, dropped);
        if self.upper.len() > self.capacity {
            self.upper.pop_front();
            self.lower.pop_front();
        }
    }

    #[inline]
    fn slide(&mut self, new_close: f64, dropped: f64) {
        self.s1 += new_close - dropped;
        self.s2 += new_close * new_close - dropped * dropped;
        self.push_point();
    }

    #[inline]
    fn push_point(&mut self) {
        let (upper, lower) = self.band();
        self.upper.push_back(upper);
        self.lower.push_back(lower);
    }

    /// Current (upper, lower). Rounding in the rolling sums can push the variance slightly
    /// below zero, so it is clamped.
    fn band(&self) -> (f64, f64) {
        let n = self.period.as_f64();
        let mean = self.s1 / n;
        let variance = (self.s2 / n - mean * mean).max(0.0);
        let width = self.factor.value() * variance.sqrt();
        (mean + width, mean - width)
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn factor(&self) -> BandFactor {
        self.factor
    }

    pub fn upper(&self) -> Vec<f64> {
        self.upper.iter().copied().collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.lower.iter().copied().collect()
    }
}
