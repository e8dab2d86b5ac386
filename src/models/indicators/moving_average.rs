use {
    crate::{
        config::Period,
        engine::{EngineError, Result},
    },
    std::collections::VecDeque,
};

/// Simple moving average over closed candles, updated in O(1) per roll-over.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    period: Period,
    sum: f64,
    points: VecDeque<f64>,
    capacity: usize,
}

impl MovingAverage {
    /// `closes` must hold at least `points + period - 1` closed closes; only the newest are used.
    pub fn bootstrap(period: Period, closes: &[f64], points: usize) -> Result<Self> {
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

        let mut sum: f64 = data[..p].iter().sum();
        let mut out = VecDeque::with_capacity(points);
        out.push_back(sum / period.as_f64());
        for i in p..data.len() {
            sum += data[i] - data[i - p];
            out.push_back(sum / period.as_f64());
        }

        Ok(Self {
            period,
            sum,
            points: out,
            capacity: points,
        })
    }

    /// `dropped` is the close leaving the window, read from the shared close window.
    #[inline]
    pub fn update(&mut self, new_close: f64, dropped: f64) {
        self.sum += new_close - dropped;
        self.points.push_back(self.sum / self.period.as_f64());
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().copied()
    }

    pub fn points(&self) -> Vec<f64> {
        self.points.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_period_average() {
        let ma = MovingAverage::bootstrap(Period::new(3), &[10.0, 20.0, 30.0, 40.0, 50.0], 3)
            .unwrap();
        assert_eq!(ma.points(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn update_slides_the_window() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0];
        let mut ma = MovingAverage::bootstrap(Period::new(3), &closes, 3).unwrap();
        ma.update(60.0, 30.0);
        assert_eq!(ma.points(), vec![30.0, 40.0, 50.0]);
        assert_eq!(ma.latest(), Some(50.0));
    }

    #[test]
    fn short_history_is_rejected() {
        assert_eq!(
            MovingAverage::bootstrap(Period::new(3), &[1.0, 2.0, 3.0], 3),
            Err(EngineError::InsufficientHistory {
                required: 5,
                available: 3
            })
        );
    }
}
