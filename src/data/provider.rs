use {
    crate::{
        config::{DF, history_filename},
        data::CandleRequest,
        engine::Tick,
        models::HistoricalOhlcv,
    },
    anyhow::{Context, Result, bail},
    async_trait::async_trait,
    std::path::{Path, PathBuf},
};

/// Source of history responses. The live feed is out of scope; only the request/response
/// shape is fixed here.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn signature(&self) -> &'static str;

    /// History covering `request`, oldest first, in `request.request_resolution`.
    async fn fetch_history(&self, request: &CandleRequest) -> Result<HistoricalOhlcv>;
}

/// Reads recorded responses from `<directory>/ohlcv_<SYMBOL>_<code>.json`.
pub struct JsonFileProvider {
    directory: PathBuf,
}

impl JsonFileProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, request: &CandleRequest) -> PathBuf {
        self.directory
            .join(history_filename(&request.symbol, request.request_resolution))
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    fn signature(&self) -> &'static str {
        "Recorded History"
    }

    async fn fetch_history(&self, request: &CandleRequest) -> Result<HistoricalOhlcv> {
        let full_path = self.path_for(request);
        let mut history = read_history(&full_path).await?;

        // A recording may run past the requested end.
        let keep = history.timestamps.partition_point(|&t| t <= request.to);
        if keep < history.len() {
            history.timestamps.truncate(keep);
            history.open.truncate(keep);
            history.high.truncate(keep);
            history.low.truncate(keep);
            history.close.truncate(keep);
            history.volume.truncate(keep);
        }

        if history.len() < request.required_candles {
            bail!(
                "{:?} holds {} candles up to {}, request needs {}",
                full_path,
                history.len(),
                request.to,
                request.required_candles
            );
        }

        #[cfg(debug_assertions)]
        if DF.log_store {
            log::info!(
                "{}: {} candles for {}",
                self.signature(),
                history.len(),
                request
            );
        }
        Ok(history)
    }
}

/// Loads and validates one history response from disk.
pub async fn read_history(path: &Path) -> Result<HistoricalOhlcv> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read history: {:?}", path))?;
    let history: HistoricalOhlcv = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to deserialize history from: {:?}", path))?;
    history
        .validate()
        .with_context(|| format!("Rejected history in: {:?}", path))?;
    Ok(history)
}

/// Trades recorded one JSON object per line. Blank lines are skipped.
pub async fn read_tick_log(path: &Path) -> Result<Vec<Tick>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read tick log: {:?}", path))?;
    parse_tick_lines(&text).with_context(|| format!("Bad tick log: {:?}", path))
}

fn parse_tick_lines(text: &str) -> Result<Vec<Tick>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Tick>(line).with_context(|| format!("line {}", i + 1))
        })
        .collect()
}
