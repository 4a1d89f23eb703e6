//! Relative Strength Index (RSI) indicator.

use crate::services::signals::Indicator;

/// Value returned when there is not enough history, or no movement at all.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Gains and losses are averaged over the last `period` price changes only.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn id(&self) -> &str {
        "rsi"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.min_periods() {
            return NEUTRAL_RSI;
        }

        let window = &prices[prices.len() - self.min_periods()..];
        let (gains, losses) = window
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .fold((0.0, 0.0), |(gains, losses), change| {
                if change > 0.0 {
                    (gains + change, losses)
                } else {
                    (gains, losses - change)
                }
            });

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        if avg_loss == 0.0 {
            // A flat window has no strength either way.
            return if avg_gain == 0.0 { NEUTRAL_RSI } else { 100.0 };
        }

        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}
