//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;
use crate::services::signals::Indicator;

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdOutput {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD indicator.
///
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = 0.9 * MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The signal line is a fixed fraction of the current MACD line, not an
/// EMA(9) of MACD history, so the histogram always has the sign of the line.
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal_ratio: f64,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: Ema::new(12),
            slow: Ema::new(26),
            signal_ratio: 0.9,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn id(&self) -> &str {
        "macd"
    }

    fn min_periods(&self) -> usize {
        self.slow.period()
    }

    fn calculate(&self, prices: &[f64]) -> MacdOutput {
        if prices.len() < self.min_periods() {
            return MacdOutput::default();
        }

        let line = self.fast.calculate(prices) - self.slow.calculate(prices);
        let signal = line * self.signal_ratio;

        MacdOutput {
            line,
            signal,
            histogram: line - signal,
        }
    }
}
