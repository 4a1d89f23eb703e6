//! Exponential Moving Average (EMA) indicator.

use super::mean;
use crate::services::signals::Indicator;

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices. Seeded with the simple
/// average of the first `period` prices. Shorter series fall back to the
/// simple average of everything available.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn id(&self) -> &str {
        "ema"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.period {
            return mean(prices);
        }

        let multiplier = 2.0 / (self.period as f64 + 1.0);

        // First EMA is SMA
        let mut ema = mean(&prices[..self.period]);
        for price in &prices[self.period..] {
            ema = (price - ema) * multiplier + ema;
        }

        ema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_constant_series() {
        let prices = vec![2.5; 40];
        for period in [5, 12, 20, 26] {
            assert_eq!(Ema::new(period).calculate(&prices), 2.5);
        }
    }

    #[test]
    fn test_ema_short_series_is_mean() {
        let value = Ema::new(20).calculate(&[1.0, 2.0, 3.0]);
        assert_eq!(value, 2.0);
    }

    #[test]
    fn test_ema_empty_series() {
        assert_eq!(Ema::new(5).calculate(&[]), 0.0);
    }

    #[test]
    fn test_ema_exact_period_is_sma() {
        let value = Ema::new(4).calculate(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(value, 2.5);
    }

    #[test]
    fn test_ema_recursive_step() {
        // period 3 -> multiplier 0.5, seed = 2.0, then (6 - 2) * 0.5 + 2 = 4
        let value = Ema::new(3).calculate(&[1.0, 2.0, 3.0, 6.0]);
        assert!((value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fast_ema_leads_in_uptrend() {
        let prices: Vec<f64> = (0..40).map(|i| 1.0 + i as f64 * 0.001).collect();
        assert!(Ema::new(5).calculate(&prices) > Ema::new(20).calculate(&prices));
    }
}
