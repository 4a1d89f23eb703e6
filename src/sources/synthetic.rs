//! Synthetic price generator.
//!
//! Produces a bounded random walk with a per-series drift so generated
//! lines show short-term trend instead of pure noise.

use super::{PriceProvider, PriceSeries, ProviderError};
use crate::types::{Candle, Provenance};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

/// Base price is drawn from [BASE_PRICE, BASE_PRICE + BASE_SPREAD).
const BASE_PRICE: f64 = 1.0;
const BASE_SPREAD: f64 = 0.1;
/// Maximum absolute random step per price.
const STEP_SIZE: f64 = 0.001;
/// Per-step drift, sign chosen once per series.
const DRIFT: f64 = 0.0001;
/// Floor keeping every generated price positive.
const MIN_PRICE: f64 = 0.0001;
/// Maximum wick beyond open/close for generated candles.
const WICK_SIZE: f64 = 0.0005;

/// Random walk state for one series.
struct Walk {
    price: f64,
    drift: f64,
}

impl Walk {
    fn start<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let price = BASE_PRICE + rng.gen::<f64>() * BASE_SPREAD;
        let drift = if rng.gen_bool(0.5) { DRIFT } else { -DRIFT };
        Self { price, drift }
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let change = (rng.gen::<f64>() - 0.5) * 2.0 * STEP_SIZE;
        self.price = (self.price + change + self.drift).max(MIN_PRICE);
        self.price
    }
}

/// Generate `window` closing prices, oldest first.
pub fn random_walk<R: Rng + ?Sized>(rng: &mut R, window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }

    let mut walk = Walk::start(rng);
    let mut prices = Vec::with_capacity(window);
    prices.push(walk.price);
    for _ in 1..window {
        prices.push(walk.step(rng));
    }
    prices
}

/// Generate `count` OHLC candles of `period_secs` each, the last one ending at `now`.
pub fn random_candles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    period_secs: u32,
    now: i64,
) -> Vec<Candle> {
    let mut walk = Walk::start(rng);
    let period = i64::from(period_secs);

    (0..count)
        .map(|i| {
            let open = walk.price;
            let close = walk.step(rng);
            let high = open.max(close) + rng.gen::<f64>() * WICK_SIZE;
            let low = (open.min(close) - rng.gen::<f64>() * WICK_SIZE).max(MIN_PRICE);
            Candle {
                time: now - (count - i) as i64 * period,
                open,
                high,
                low,
                close,
            }
        })
        .collect()
}

/// Synthetic price provider.
///
/// Seeded providers are reproducible; unseeded ones draw from the
/// thread-local random source.
pub struct SyntheticProvider {
    rng: Option<Mutex<StdRng>>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self { rng: None }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match &self.rng {
            Some(rng) => {
                let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                f(&mut *guard)
            }
            None => f(&mut rand::thread_rng()),
        }
    }

    /// Generate a closing-price series synchronously.
    pub fn series(&self, window: usize) -> Vec<f64> {
        self.with_rng(|rng| random_walk(rng, window))
    }

    /// Generate candles ending now synchronously.
    pub fn candles(&self, count: usize, period_secs: u32) -> Vec<Candle> {
        let now = chrono::Utc::now().timestamp();
        self.with_rng(|rng| random_candles(rng, count, period_secs, now))
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for SyntheticProvider {
    fn provenance(&self) -> Provenance {
        Provenance::Simulated
    }

    async fn get_candles(
        &self,
        instrument: &str,
        period_secs: u32,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        debug!("Generating {} synthetic candles for {}", count, instrument);
        Ok(self.candles(count, period_secs))
    }

    async fn get_prices(
        &self,
        instrument: &str,
        _timeframe_secs: u32,
        window: usize,
    ) -> Result<PriceSeries, ProviderError> {
        debug!("Generating {} synthetic prices for {}", window, instrument);
        Ok(PriceSeries {
            prices: self.series(window),
            provenance: Provenance::Simulated,
        })
    }
}
