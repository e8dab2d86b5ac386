//! Incremental chart indicators and their persisted parameters.

mod bollinger;
mod moving_average;

pub use bollinger::BollingerBands;
pub use moving_average::MovingAverage;

use {
    crate::{
        config::{BandFactor, EngineConfig, Period},
        engine::{EngineError, Result},
        models::CloseWindow,
    },
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    #[strum(to_string = "Moving Average")]
    MovingAverage,
    #[strum(to_string = "Bollinger Bands")]
    BollingerBands,
}

/// Everything needed to rebuild one indicator. This is the only indicator state that is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorParams {
    MovingAverage { period: Period },
    BollingerBands { period: Period, factor: BandFactor },
}

impl IndicatorParams {
    pub fn moving_average(period: usize) -> Self {
        Self::MovingAverage {
            period: Period::new(period),
        }
    }

    pub fn bollinger(period: usize, factor: f64) -> Self {
        Self::BollingerBands {
            period: Period::new(period),
            factor: BandFactor::new(factor),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::MovingAverage { .. } => IndicatorKind::MovingAverage,
            Self::BollingerBands { .. } => IndicatorKind::BollingerBands,
        }
    }

    pub fn period(&self) -> Period {
        match self {
            Self::MovingAverage { period } | Self::BollingerBands { period, .. } => *period,
        }
    }

    pub fn factor(&self) -> Option<BandFactor> {
        match self {
            Self::MovingAverage { .. } => None,
            Self::BollingerBands { factor, .. } => Some(*factor),
        }
    }

    /// `period ∈ (0, max_period]`, `factor ∈ (0, max_factor]`.
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        let period = self.period().value();
        if period == 0 || period > config.max_period {
            return Err(EngineError::InvalidParameter(format!(
                "period {} outside (0, {}]",
                period, config.max_period
            )));
        }
        if let Some(factor) = self.factor() {
            let f = factor.value();
            if !f.is_finite() || f <= 0.0 || f > config.max_factor {
                return Err(EngineError::InvalidParameter(format!(
                    "factor {} outside (0, {}]",
                    f, config.max_factor
                )));
            }
        }
        Ok(())
    }

    /// Compact text form: `"<period>"` for a moving average,
    /// `"<period>/<period>/<factor>"` for Bollinger bands.
    pub fn to_text(&self) -> String {
        match self {
            Self::MovingAverage { period } => period.to_string(),
            Self::BollingerBands { period, factor } => {
                format!("{}/{}/{}", period, period, factor.value())
            }
        }
    }

    pub fn from_text(kind: IndicatorKind, text: &str) -> Result<Self> {
        let bad =
            || EngineError::InvalidParameter(format!("cannot parse {} from '{}'", kind, text));
        let parse_period = |s: &str| s.trim().parse::<usize>().map_err(|_| bad());

        match kind {
            IndicatorKind::MovingAverage => Ok(Self::moving_average(parse_period(text)?)),
            IndicatorKind::BollingerBands => {
                let parts: Vec<&str> = text.split('/').collect();
                let [ma_period, period, factor] = parts.as_slice() else {
                    return Err(bad());
                };
                // The first field is the average period, which always equals the band period.
                parse_period(ma_period)?;
                let factor = factor.trim().parse::<f64>().map_err(|_| bad())?;
                Ok(Self::bollinger(parse_period(period)?, factor))
            }
        }
    }

    /// Label the chart legend shows for this indicator.
    pub fn label(&self) -> String {
        match self {
            Self::MovingAverage { period } => format!("MA({})", period),
            Self::BollingerBands { period, factor } => format!("BB({}, {})", period, factor),
        }
    }
}

/// Incremental indicator state, dispatched by `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSeries {
    MovingAverage(MovingAverage),
    BollingerBands(BollingerBands),
}

impl IndicatorSeries {
    /// `closes` are closed-candle closes, oldest first.
    pub fn bootstrap(params: IndicatorParams, closes: &[f64], points: usize) -> Result<Self> {
        match params {
            IndicatorParams::MovingAverage { period } => {
                MovingAverage::bootstrap(period, closes, points).map(Self::MovingAverage)
            }
            IndicatorParams::BollingerBands { period, factor } => {
                BollingerBands::bootstrap(period, factor, closes, points).map(Self::BollingerBands)
            }
        }
    }

    pub fn params(&self) -> IndicatorParams {
        match self {
            Self::MovingAverage(ma) => IndicatorParams::MovingAverage { period: ma.period() },
            Self::BollingerBands(bb) => IndicatorParams::BollingerBands {
                period: bb.period(),
                factor: bb.factor(),
            },
        }
    }

    pub fn period(&self) -> Period {
        self.params().period()
    }

    /// Must run before `new_close` is pushed into `window`.
    pub fn update(&mut self, window: &CloseWindow, new_close: f64) -> Result<()> {
        let dropped = window.dropped_for(self.period()).ok_or_else(|| {
            EngineError::InsufficientHistory {
                required: self.period().value(),
                available: window.len(),
            }
        })?;
        match self {
            Self::MovingAverage(ma) => ma.update(new_close, dropped),
            Self::BollingerBands(bb) => bb.update(new_close, dropped),
        }
        Ok(())
    }

    pub fn paint(&self) -> IndicatorPaint {
        let params = self.params();
        let lines = match self {
            Self::MovingAverage(ma) => vec![ma.points()],
            Self::BollingerBands(bb) => vec![bb.upper(), bb.lower()],
        };
        IndicatorPaint {
            label: params.label(),
            params,
            lines,
        }
    }
}

/// Points for the chart collaborator: one line for an average, upper then lower for bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPaint {
    pub label: String,
    pub params: IndicatorParams,
    pub lines: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENGINE;

    #[test]
    fn parameter_bounds() {
        assert!(IndicatorParams::moving_average(400).validate(&ENGINE).is_ok());
        assert!(IndicatorParams::moving_average(401).validate(&ENGINE).is_err());
        assert!(IndicatorParams::moving_average(0).validate(&ENGINE).is_err());
        assert!(IndicatorParams::bollinger(20, 5.0).validate(&ENGINE).is_ok());
        assert!(IndicatorParams::bollinger(20, 5.01).validate(&ENGINE).is_err());
        assert!(IndicatorParams::bollinger(20, 0.0).validate(&ENGINE).is_err());
        assert!(IndicatorParams::bollinger(20, f64::NAN).validate(&ENGINE).is_err());
    }

    #[test]
    fn text_form_round_trips() {
        let ma = IndicatorParams::moving_average(38);
        assert_eq!(ma.to_text(), "38");
        assert_eq!(IndicatorParams::from_text(IndicatorKind::MovingAverage, "38"), Ok(ma));

        let bb = IndicatorParams::bollinger(20, 2.5);
        assert_eq!(bb.to_text(), "20/20/2.5");
        assert_eq!(
            IndicatorParams::from_text(IndicatorKind::BollingerBands, "20/20/2.5"),
            Ok(bb)
        );
        assert!(IndicatorParams::from_text(IndicatorKind::BollingerBands, "20/2.5").is_err());
        assert!(IndicatorParams::from_text(IndicatorKind::MovingAverage, "x").is_err());
    }

    #[test]
    fn serde_form_is_tagged() {
        let json = serde_json::to_string(&IndicatorParams::bollinger(20, 2.0)).unwrap();
        assert_eq!(json, r#"{"kind":"bollinger_bands","period":20,"factor":2.0}"#);
        let back: IndicatorParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, IndicatorParams::bollinger(20, 2.0));
    }

    #[test]
    fn update_reads_dropped_close_from_window() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0];
        let mut window = CloseWindow::from_closes(&closes, 3);
        let mut ma =
            IndicatorSeries::bootstrap(IndicatorParams::moving_average(3), &closes, 3).unwrap();
        ma.update(&window, 60.0).unwrap();
        window.push(60.0);
        assert_eq!(ma.paint().lines, vec![vec![30.0, 40.0, 50.0]]);
        assert_eq!(ma.paint().label, "MA(3)");
    }
}
