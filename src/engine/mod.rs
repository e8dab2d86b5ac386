mod error;
mod messages;
mod store;

pub use {
    error::{EngineError, Result},
    messages::{AttachOutcome, DetachOutcome, StoreEvent, Tick},
    store::MarketDataStore,
};
