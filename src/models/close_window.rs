use {crate::config::Period, std::collections::VecDeque};

/// Most recent closed-candle closes of one chart, oldest first. Shared by every indicator on
/// that chart; holds at least as many closes as the largest period in use.
#[derive(Debug, Clone, Default)]
pub struct CloseWindow {
    closes: VecDeque<f64>,
    capacity: usize,
}

impl CloseWindow {
    /// Keeps the newest `capacity` values of `closes`.
    pub fn from_closes(closes: &[f64], capacity: usize) -> Self {
        let skip = closes.len().saturating_sub(capacity);
        Self {
            closes: closes[skip..].iter().copied().collect(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The close that leaves a `period`-wide window when the next close arrives.
    #[inline]
    pub fn dropped_for(&self, period: Period) -> Option<f64> {
        let p = period.value();
        if p == 0 || p > self.closes.len() {
            return None;
        }
        self.closes.get(self.closes.len() - p).copied()
    }

    #[inline]
    pub fn push(&mut self, close: f64) {
        self.closes.push_back(close);
        while self.closes.len() > self.capacity {
            self.closes.pop_front();
        }
    }

    /// Drops the oldest closes beyond `capacity`. Never grows.
    pub fn shrink_to(&mut self, capacity: usize) {
        if capacity >= self.capacity {
            return;
        }
        self.capacity = capacity;
        while self.closes.len() > capacity {
            self.closes.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.closes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_value_is_period_back_from_newest() {
        let w = CloseWindow::from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert_eq!(w.len(), 4);
        assert_eq!(w.dropped_for(Period::new(3)), Some(3.0));
        assert_eq!(w.dropped_for(Period::new(4)), Some(2.0));
        assert_eq!(w.dropped_for(Period::new(5)), None);
    }

    #[test]
    fn push_evicts_oldest() {
        let mut w = CloseWindow::from_closes(&[1.0, 2.0], 2);
        w.push(3.0);
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn shrink_keeps_newest() {
        let mut w = CloseWindow::from_closes(&[1.0, 2.0, 3.0], 3);
        w.shrink_to(1);
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![3.0]);
        w.shrink_to(5);
        assert_eq!(w.capacity(), 1);
    }
}
