use {
    crate::config::{DF, constants::alarms::THRESHOLD_EPSILON},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Which crossing fires the alarm. Fixed when the alarm is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmDirection {
    /// Threshold was below the price: fires when the price drops to it.
    Falling,
    /// Threshold was at or above the price: fires when the price rises to it.
    Rising,
}

impl AlarmDirection {
    pub fn arm(threshold: f64, last_price: f64) -> Self {
        if threshold < last_price {
            Self::Falling
        } else {
            Self::Rising
        }
    }

    #[inline]
    pub fn is_crossed(&self, threshold: f64, price: f64) -> bool {
        match self {
            Self::Falling => price <= threshold,
            Self::Rising => price >= threshold,
        }
    }
}

/// Persisted form of one alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub symbol: String,
    pub threshold: f64,
    pub direction: AlarmDirection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Alarm {
    threshold: f64,
    direction: AlarmDirection,
}

/// Price alarms per symbol. A symbol entry exists only while it has alarms.
#[derive(Debug, Clone, Default)]
pub struct AlarmBook {
    alarms: BTreeMap<String, Vec<Alarm>>,
}

impl AlarmBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an alarm with the same threshold already exists.
    pub fn add(&mut self, symbol: &str, threshold: f64, last_price: f64) -> bool {
        let list = self.alarms.entry(symbol.to_string()).or_default();
        if list.iter().any(|a| same_threshold(a.threshold, threshold)) {
            return false;
        }
        list.push(Alarm {
            threshold,
            direction: AlarmDirection::arm(threshold, last_price),
        });
        true
    }

    pub fn remove(&mut self, symbol: &str, threshold: f64) -> bool {
        let Some(list) = self.alarms.get_mut(symbol) else {
            return false;
        };
        let before = list.len();
        list.retain(|a| !same_threshold(a.threshold, threshold));
        let removed = list.len() != before;
        if list.is_empty() {
            self.alarms.remove(symbol);
        }
        removed
    }

    /// Fires and disarms every alarm of `symbol` crossed by `price`.
    pub fn check(&mut self, symbol: &str, price: f64) -> Vec<AlarmRecord> {
        let Some(list) = self.alarms.get_mut(symbol) else {
            return Vec::new();
        };

        let mut fired = Vec::new();
        list.retain(|a| {
            if a.direction.is_crossed(a.threshold, price) {
                fired.push(AlarmRecord {
                    symbol: symbol.to_string(),
                    threshold: a.threshold,
                    direction: a.direction,
                });
                false
            } else {
                true
            }
        });
        if list.is_empty() {
            self.alarms.remove(symbol);
        }

        #[cfg(debug_assertions)]
        if DF.log_alarms && !fired.is_empty() {
            log::info!("{}: {} alarm(s) fired at {}", symbol, fired.len(), price);
        }
        fired
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.alarms.contains_key(symbol)
    }

    pub fn thresholds(&self, symbol: &str) -> Vec<f64> {
        self.alarms
            .get(symbol)
            .map(|l| l.iter().map(|a| a.threshold).collect())
            .unwrap_or_default()
    }

    pub fn records(&self) -> Vec<AlarmRecord> {
        self.alarms
            .iter()
            .flat_map(|(symbol, list)| {
                list.iter().map(move |a| AlarmRecord {
                    symbol: symbol.clone(),
                    threshold: a.threshold,
                    direction: a.direction,
                })
            })
            .collect()
    }

    /// Re-arms persisted alarms with their stored direction.
    pub fn restore(&mut self, records: &[AlarmRecord]) {
        for r in records {
            let list = self.alarms.entry(r.symbol.clone()).or_default();
            if !list.iter().any(|a| same_threshold(a.threshold, r.threshold)) {
                list.push(Alarm {
                    threshold: r.threshold,
                    direction: r.direction,
                });
            }
        }
    }
}

#[inline]
fn same_threshold(a: f64, b: f64) -> bool {
    (a - b).abs() <= THRESHOLD_EPSILON * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_depends_on_price_at_creation() {
        let mut book = AlarmBook::new();
        book.add("AAPL", 90.0, 100.0);
        book.add("AAPL", 110.0, 100.0);
        let dirs: Vec<_> = book.records().iter().map(|r| r.direction).collect();
        assert_eq!(dirs, vec![AlarmDirection::Falling, AlarmDirection::Rising]);
    }

    #[test]
    fn crossing_fires_once_and_disarms() {
        let mut book = AlarmBook::new();
        book.add("AAPL", 90.0, 100.0);
        book.add("AAPL", 110.0, 100.0);
        assert!(book.check("AAPL", 95.0).is_empty());
        let fired = book.check("AAPL", 89.5);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].threshold, 90.0);
        assert!(book.check("AAPL", 80.0).is_empty());
        assert_eq!(book.thresholds("AAPL"), vec![110.0]);
    }

    #[test]
    fn duplicates_are_ignored_and_empty_symbols_dropped() {
        let mut book = AlarmBook::new();
        assert!(book.add("MSFT", 300.0, 310.0));
        assert!(!book.add("MSFT", 300.0, 250.0));
        assert!(book.has_symbol("MSFT"));
        book.check("MSFT", 299.0);
        assert!(!book.has_symbol("MSFT"));
    }

    #[test]
    fn records_restore_with_their_direction() {
        let mut book = AlarmBook::new();
        book.add("TSLA", 200.0, 250.0);
        let records = book.records();

        let mut restored = AlarmBook::new();
        restored.restore(&records);
        assert_eq!(restored.records(), records);
        assert!(restored.remove("TSLA", 200.0));
        assert!(!restored.has_symbol("TSLA"));
    }
}
