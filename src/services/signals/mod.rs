//! Trading signal analysis.
//!
//! Provides technical indicator calculations over closing-price series and
//! the fixed-weight scoring engine that fuses them into a direction and
//! confidence.

pub mod indicators;
pub mod scoring;

pub use scoring::{Analysis, ScoringEngine};

/// Trait for implementing technical indicators.
///
/// Indicators are pure and total: a series shorter than `min_periods`
/// yields a documented neutral value rather than an error.
pub trait Indicator: Send + Sync {
    /// Value produced by the indicator.
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &str;

    /// Minimum number of prices required for a full calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from closing prices, oldest first.
    fn calculate(&self, prices: &[f64]) -> Self::Output;
}

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(41.23456, 2), 41.23);
        assert_eq!(round_to(1.000049, 4), 1.0);
        assert_eq!(round_to(-0.000051, 4), -0.0001);
    }
}
