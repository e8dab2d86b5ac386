mod alarm;
mod candle_series;
mod close_window;
pub mod converter;
pub mod indicators;
mod ohlcv;
mod registry;

pub use {
    alarm::{AlarmBook, AlarmDirection, AlarmRecord},
    candle_series::{CandleSeries, TickOutcome},
    close_window::CloseWindow,
    indicators::{
        BollingerBands, IndicatorKind, IndicatorPaint, IndicatorParams, IndicatorSeries,
        MovingAverage,
    },
    ohlcv::{HistoricalOhlcv, STATUS_OK},
    registry::{IndicatorRegistry, WindowHandle},
};
