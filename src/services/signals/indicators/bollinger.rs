//! Bollinger Bands indicator.

use super::mean;
use crate::services::signals::Indicator;

/// Upper, middle and lower band values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bands {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the population standard deviation of the same window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period: period.max(1),
            std_dev_multiplier,
        }
    }

    /// Calculate standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = Bands;

    fn id(&self) -> &str {
        "bollinger"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> Bands {
        if prices.len() < self.period {
            return Bands::default();
        }

        let window = &prices[prices.len() - self.period..];
        let mid = mean(window);
        let width = self.std_dev_multiplier * Self::std_dev(window, mid);

        Bands {
            upper: mid + width,
            mid,
            lower: mid - width,
        }
    }
}
