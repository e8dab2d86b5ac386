use {
    crate::{
        domain::Candle,
        engine::{EngineError, Result},
    },
    itertools::izip,
    serde::{Deserialize, Serialize},
};

pub const STATUS_OK: &str = "ok";

/// Parallel OHLCV arrays as delivered by the history endpoint, oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HistoricalOhlcv {
    #[serde(rename = "o", default)]
    pub open: Vec<f64>,
    #[serde(rename = "h", default)]
    pub high: Vec<f64>,
    #[serde(rename = "l", default)]
    pub low: Vec<f64>,
    #[serde(rename = "c", default)]
    pub close: Vec<f64>,
    #[serde(rename = "v", default)]
    pub volume: Vec<f64>,
    #[serde(rename = "t", default)]
    pub timestamps: Vec<i64>,
    #[serde(rename = "s")]
    pub status: String,
}

impl HistoricalOhlcv {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let len = candles.len();
        let mut out = Self {
            open: Vec::with_capacity(len),
            high: Vec::with_capacity(len),
            low: Vec::with_capacity(len),
            close: Vec::with_capacity(len),
            volume: Vec::with_capacity(len),
            timestamps: Vec::with_capacity(len),
            status: STATUS_OK.to_string(),
        };
        for c in candles {
            out.timestamps.push(c.timestamp);
            out.open.push(c.open);
            out.high.push(c.high);
            out.low.push(c.low);
            out.close.push(c.close);
            out.volume.push(c.volume as f64);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Status first, then array shape, then ordering.
    pub fn validate(&self) -> Result<()> {
        if self.status != STATUS_OK {
            return Err(EngineError::UpstreamStatus(self.status.clone()));
        }

        let len = self.timestamps.len();
        let lens = [
            ("o", self.open.len()),
            ("h", self.high.len()),
            ("l", self.low.len()),
            ("c", self.close.len()),
            ("v", self.volume.len()),
        ];
        if let Some((name, other)) = lens.iter().find(|(_, l)| *l != len) {
            return Err(EngineError::MalformedHistory(format!(
                "array '{}' has {} entries, 't' has {}",
                name, other, len
            )));
        }

        if let Some(pos) = self.timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(EngineError::MalformedHistory(format!(
                "timestamps not ascending at index {}",
                pos + 1
            )));
        }
        Ok(())
    }

    /// All candles, oldest first. Call `validate` first; extra entries in longer arrays are ignored.
    pub fn candles(&self) -> Vec<Candle> {
        izip!(
            &self.timestamps,
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.volume
        )
        .map(|(&t, &o, &h, &l, &c, &v)| Candle::new(t, o, h, l, c, Candle::volume_from(v)))
        .collect()
    }

    /// The newest `count` candles, oldest first.
    pub fn last_candles(&self, count: usize) -> Result<Vec<Candle>> {
        self.validate()?;
        let available = self.len();
        if available < count {
            return Err(EngineError::InsufficientHistory {
                required: count,
                available,
            });
        }
        let mut candles = self.candles();
        candles.drain(..available - count);
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HistoricalOhlcv {
        HistoricalOhlcv::from_candles(&[
            Candle::new(0, 1.0, 2.0, 0.5, 1.5, 10),
            Candle::new(60, 1.5, 2.5, 1.0, 2.0, 20),
            Candle::new(120, 2.0, 3.0, 1.5, 2.5, 30),
        ])
    }

    #[test]
    fn decodes_compact_field_names() {
        let json = r#"{"o":[1.0],"h":[2.0],"l":[0.5],"c":[1.5],"v":[12.4],"t":[60],"s":"ok"}"#;
        let h: HistoricalOhlcv = serde_json::from_str(json).unwrap();
        h.validate().unwrap();
        assert_eq!(h.candles(), vec![Candle::new(60, 1.0, 2.0, 0.5, 1.5, 12)]);
    }

    #[test]
    fn no_data_status_is_rejected() {
        let h: HistoricalOhlcv = serde_json::from_str(r#"{"s":"no_data"}"#).unwrap();
        assert_eq!(
            h.validate(),
            Err(EngineError::UpstreamStatus("no_data".to_string()))
        );
    }

    #[test]
    fn mismatched_arrays_are_malformed() {
        let mut h = sample();
        h.close.pop();
        assert!(matches!(h.validate(), Err(EngineError::MalformedHistory(_))));
    }

    #[test]
    fn unordered_timestamps_are_malformed() {
        let mut h = sample();
        h.timestamps.swap(0, 1);
        assert!(matches!(h.validate(), Err(EngineError::MalformedHistory(_))));
    }

    #[test]
    fn last_candles_takes_newest() {
        let h = sample();
        let last = h.last_candles(2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].timestamp, 60);
        assert_eq!(last[1].timestamp, 120);
        assert_eq!(
            h.last_candles(4),
            Err(EngineError::InsufficientHistory {
                required: 4,
                available: 3
            })
        );
    }
}
