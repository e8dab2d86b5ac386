//! Configuration module for the chart engine.

// Can all be private now because we have a public re-export.
mod debug;
mod engine;
mod persistence;
mod types;

// Public
pub mod constants;

// Re-export commonly used items
pub use debug::{DF, LogFlags};
pub use engine::{ENGINE, EngineConfig, TradingCalendar};
pub use persistence::{PERSISTENCE, history_filename};
pub use types::{BandFactor, ChartId, Period, Resolution};
