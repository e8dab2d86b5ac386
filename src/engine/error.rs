use crate::config::{ChartId, Resolution};
use thiserror::Error;

/// All errors generated by the chart engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient history: {required} candles required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("invalid indicator parameter: {0}")]
    InvalidParameter(String),

    #[error("upstream returned status '{0}'")]
    UpstreamStatus(String),

    #[error("malformed history: {0}")]
    MalformedHistory(String),

    #[error("unknown resolution: '{0}'")]
    UnknownResolution(String),

    #[error("no series for {symbol} at {resolution}")]
    SeriesNotFound {
        symbol: String,
        resolution: Resolution,
    },

    #[error("{0} is not attached")]
    ChartNotFound(ChartId),

    #[error("{0} is already attached")]
    ChartAlreadyAttached(ChartId),

    #[error("history required to create series {symbol} at {resolution}")]
    HistoryRequired {
        symbol: String,
        resolution: Resolution,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
