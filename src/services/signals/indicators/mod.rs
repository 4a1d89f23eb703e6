//! Technical indicator implementations.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use bollinger::{Bands, BollingerBands};
pub use ema::Ema;
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;

/// Simple average of a price slice, 0 for an empty slice.
pub(crate) fn mean(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    prices.iter().sum::<f64>() / prices.len() as f64
}
