// Domain types and value objects
mod candle;
mod series_key;

// Re-export commonly used types to the world
pub use candle::Candle;
pub use series_key::SeriesKey;
