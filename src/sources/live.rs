//! Live price provider backed by an external market-data API.

use super::{PriceProvider, PriceSeries, ProviderError};
use crate::types::{Candle, Provenance};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// External market-data collaborator.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Establish (or refresh) an authenticated session.
    async fn connect(&self) -> Result<(), ProviderError>;

    /// Fetch `count` candles of `period_secs` each, ending at `as_of` (unix seconds).
    async fn get_candles(
        &self,
        asset: &str,
        period_secs: u32,
        count: usize,
        as_of: i64,
    ) -> Result<Vec<Candle>, ProviderError>;
}

/// Price provider that fetches from a [`MarketDataClient`] under a timeout.
///
/// Connectivity, authentication, shape and timeout failures all surface
/// as [`ProviderError`] so the caller can fall back.
pub struct LiveProvider {
    client: Arc<dyn MarketDataClient>,
    timeout: Duration,
}

impl LiveProvider {
    pub fn new(client: Arc<dyn MarketDataClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn fetch(
        &self,
        instrument: &str,
        period_secs: u32,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        self.client.connect().await?;
        let as_of = chrono::Utc::now().timestamp();
        self.client
            .get_candles(instrument, period_secs, count, as_of)
            .await
    }
}

/// Check that candles form a usable, positive closing-price series.
fn validate(candles: &[Candle]) -> Result<(), ProviderError> {
    if candles.is_empty() {
        return Err(ProviderError::Malformed("no candles returned".to_string()));
    }
    if let Some(bad) = candles.iter().find(|c| !c.close.is_finite() || c.close <= 0.0) {
        return Err(ProviderError::Malformed(format!(
            "non-positive close {} at {}",
            bad.close, bad.time
        )));
    }
    Ok(())
}

#[async_trait]
impl PriceProvider for LiveProvider {
    fn provenance(&self) -> Provenance {
        Provenance::Live
    }

    async fn get_candles(
        &self,
        instrument: &str,
        period_secs: u32,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let candles = tokio::time::timeout(self.timeout, self.fetch(instrument, period_secs, count))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        validate(&candles)?;
        debug!("Fetched {} live candles for {}", candles.len(), instrument);

        let start = candles.len().saturating_sub(count);
        Ok(candles[start..].to_vec())
    }

    async fn get_prices(
        &self,
        instrument: &str,
        timeframe_secs: u32,
        window: usize,
    ) -> Result<PriceSeries, ProviderError> {
        let candles = self.get_candles(instrument, timeframe_secs, window).await?;

        Ok(PriceSeries {
            prices: candles.iter().map(|c| c.close).collect(),
            provenance: Provenance::Live,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted client for exercising the provider.
    struct MockClient {
        connect_ok: bool,
        candles: Vec<Candle>,
        delay: Duration,
        connects: AtomicUsize,
    }

    impl MockClient {
        fn returning(closes: &[f64]) -> Self {
            Self {
                connect_ok: true,
                candles: closes
                    .iter()
                    .enumerate()
                    .map(|(i, close)| Candle {
                        time: i as i64 * 60,
                        open: *close,
                        high: *close,
                        low: *close,
                        close: *close,
                    })
                    .collect(),
                delay: Duration::ZERO,
                connects: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataClient for MockClient {
        async fn connect(&self) -> Result<(), ProviderError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.connect_ok {
                Ok(())
            } else {
                Err(ProviderError::Auth("invalid credentials".to_string()))
            }
        }

        async fn get_candles(
            &self,
            _asset: &str,
            _period_secs: u32,
            _count: usize,
            _as_of: i64,
        ) -> Result<Vec<Candle>, ProviderError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.candles.clone())
        }
    }

    fn provider(client: MockClient) -> LiveProvider {
        LiveProvider::new(Arc::new(client), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_live_prices_extract_closes() {
        let provider = provider(MockClient::returning(&[1.1, 1.2, 1.3]));
        let series = provider.get_prices("EURUSD", 60, 30).await.unwrap();

        assert_eq!(series.prices, vec![1.1, 1.2, 1.3]);
        assert_eq!(series.provenance, Provenance::Live);
    }

    #[tokio::test]
    async fn test_live_prices_trimmed_to_window() {
        let provider = provider(MockClient::returning(&[1.0, 2.0, 3.0, 4.0]));
        let series = provider.get_prices("EURUSD", 60, 2).await.unwrap();
        assert_eq!(series.prices, vec![3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_live_candles_trimmed_to_count() {
        let provider = provider(MockClient::returning(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let candles = provider.get_candles("EURUSD", 60, 3).await.unwrap();

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_auth_failure_is_unavailable() {
        let mut client = MockClient::returning(&[1.0]);
        client.connect_ok = false;
        let result = provider(client).get_prices("EURUSD", 60, 30).await;
        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[tokio::test]
    async fn test_empty_candles_are_malformed() {
        let result = provider(MockClient::returning(&[])).get_prices("EURUSD", 60, 30).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_non_positive_close_is_malformed() {
        let result = provider(MockClient::returning(&[1.0, 0.0, 1.2]))
            .get_prices("EURUSD", 60, 30)
            .await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mut client = MockClient::returning(&[1.0, 1.1]);
        client.delay = Duration::from_secs(5);
        let result = provider(client).get_prices("EURUSD", 60, 30).await;
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_connects_before_each_fetch() {
        let client = Arc::new(MockClient::returning(&[1.0]));
        let provider = LiveProvider::new(client.clone(), Duration::from_millis(100));

        provider.get_candles("EURUSD", 60, 1).await.unwrap();
        provider.get_candles("EURUSD", 60, 1).await.unwrap();
        assert_eq!(client.connects.load(Ordering::SeqCst), 2);
    }
}
