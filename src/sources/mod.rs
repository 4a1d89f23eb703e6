//! Price series providers.
//!
//! A provider turns an instrument and timeframe into an ordered sequence
//! of closing prices. The live provider talks to an external market-data
//! API; the synthetic provider generates a bounded random walk and is the
//! fallback whenever live data is unavailable.

pub mod live;
pub mod market_api;
pub mod synthetic;

pub use live::{LiveProvider, MarketDataClient};
pub use market_api::HttpMarketClient;
pub use synthetic::SyntheticProvider;

use crate::types::{Candle, Provenance};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a provider could not supply data.
///
/// These never reach signal consumers; the orchestrator falls back to the
/// synthetic provider instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Market data provider is not configured")]
    NotConfigured,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Malformed provider data: {0}")]
    Malformed(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Closing prices for one instrument, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub prices: Vec<f64>,
    pub provenance: Provenance,
}

/// A source of price data.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Provenance tag attached to everything this provider returns.
    fn provenance(&self) -> Provenance;

    /// Fetch up to `count` candles of `period_secs` each, ending now.
    async fn get_candles(
        &self,
        instrument: &str,
        period_secs: u32,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError>;

    /// Fetch a closing-price series of up to `window` prices.
    async fn get_prices(
        &self,
        instrument: &str,
        timeframe_secs: u32,
        window: usize,
    ) -> Result<PriceSeries, ProviderError> {
        let candles = self.get_candles(instrument, timeframe_secs, window).await?;
        Ok(PriceSeries {
            prices: candles.iter().map(|c| c.close).collect(),
            provenance: self.provenance(),
        })
    }
}
