//! Fixed-weight scoring of indicator readings.

use rand::Rng;
use tracing::debug;

use super::indicators::{BollingerBands, Ema, Macd, Rsi};
use super::{round_to, Indicator};
use crate::types::{Direction, IndicatorSnapshot};

/// Minimum series length for a scored (non coin-flip) analysis.
pub const MIN_HISTORY: usize = 30;

/// Confidence reported for coin-flip analyses of short series.
pub const FALLBACK_CONFIDENCE: u8 = 75;

/// Upper bound on any reported confidence.
pub const MAX_CONFIDENCE: u8 = 95;

const RSI_EXTREME_WEIGHT: u32 = 30;
const RSI_LEAN_WEIGHT: u32 = 10;
const EMA_WEIGHT: u32 = 25;
const MACD_WEIGHT: u32 = 25;
const BOLLINGER_WEIGHT: u32 = 20;

/// Result of analyzing one price series.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub direction: Direction,
    pub confidence: u8,
    /// `None` for coin-flip analyses of short series.
    pub indicators: Option<IndicatorSnapshot>,
}

/// Accumulated bullish and bearish weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub bullish: u32,
    pub bearish: u32,
}

impl Scores {
    /// CALL only on a strict bullish lead; ties go to PUT.
    pub fn direction(&self) -> Direction {
        if self.bullish > self.bearish {
            Direction::Call
        } else {
            Direction::Put
        }
    }

    pub fn confidence(&self) -> u8 {
        let total = self.bullish + self.bearish;
        if total == 0 {
            return 50;
        }
        let winning = self.bullish.max(self.bearish);
        let pct = (winning as f64 / total as f64 * 100.0).round() as u8;
        pct.min(MAX_CONFIDENCE)
    }
}

/// Fuses RSI, EMA crossover, MACD and Bollinger readings into a signal.
pub struct ScoringEngine {
    rsi: Rsi,
    ema_fast: Ema,
    ema_slow: Ema,
    macd: Macd,
    bollinger: BollingerBands,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            rsi: Rsi::default(),
            ema_fast: Ema::new(5),
            ema_slow: Ema::new(20),
            macd: Macd::default(),
            bollinger: BollingerBands::default(),
        }
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a price series.
    ///
    /// Series shorter than [`MIN_HISTORY`] get a coin-flip direction drawn
    /// from `rng` with [`FALLBACK_CONFIDENCE`] and no indicators.
    pub fn analyze<R: Rng + ?Sized>(&self, prices: &[f64], rng: &mut R) -> Analysis {
        if prices.len() < MIN_HISTORY {
            debug!(
                "Only {} prices (need {}), falling back to coin flip",
                prices.len(),
                MIN_HISTORY
            );
            let direction = if rng.gen_bool(0.5) {
                Direction::Call
            } else {
                Direction::Put
            };
            return Analysis {
                direction,
                confidence: FALLBACK_CONFIDENCE,
                indicators: None,
            };
        }

        let snapshot = self.snapshot(prices);
        let current_price = prices[prices.len() - 1];
        let scores = Self::score(&snapshot, current_price);

        Analysis {
            direction: scores.direction(),
            confidence: scores.confidence(),
            indicators: Some(Self::rounded(&snapshot)),
        }
    }

    /// Compute unrounded indicator values for a series.
    pub fn snapshot(&self, prices: &[f64]) -> IndicatorSnapshot {
        let macd = self.macd.calculate(prices);
        let bands = self.bollinger.calculate(prices);

        IndicatorSnapshot {
            rsi: self.rsi.calculate(prices),
            ema_fast: self.ema_fast.calculate(prices),
            ema_slow: self.ema_slow.calculate(prices),
            macd_line: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bb_upper: bands.upper,
            bb_mid: bands.mid,
            bb_lower: bands.lower,
        }
    }

    /// Apply the rule table to raw indicator values.
    pub fn score(snapshot: &IndicatorSnapshot, current_price: f64) -> Scores {
        let mut scores = Scores::default();

        // RSI: exactly one branch fires
        if snapshot.rsi < 30.0 {
            scores.bullish += RSI_EXTREME_WEIGHT;
        } else if snapshot.rsi > 70.0 {
            scores.bearish += RSI_EXTREME_WEIGHT;
        } else if snapshot.rsi < 50.0 {
            scores.bullish += RSI_LEAN_WEIGHT;
        } else {
            scores.bearish += RSI_LEAN_WEIGHT;
        }

        // EMA crossover
        if snapshot.ema_fast > snapshot.ema_slow {
            scores.bullish += EMA_WEIGHT;
        } else {
            scores.bearish += EMA_WEIGHT;
        }

        // MACD
        if snapshot.macd_line > snapshot.macd_signal && snapshot.macd_histogram > 0.0 {
            scores.bullish += MACD_WEIGHT;
        } else if snapshot.macd_line < snapshot.macd_signal && snapshot.macd_histogram < 0.0 {
            scores.bearish += MACD_WEIGHT;
        }

        // Bollinger Bands
        if current_price < snapshot.bb_lower {
            scores.bullish += BOLLINGER_WEIGHT;
        } else if current_price > snapshot.bb_upper {
            scores.bearish += BOLLINGER_WEIGHT;
        }

        scores
    }

    fn rounded(snapshot: &IndicatorSnapshot) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: round_to(snapshot.rsi, 2),
            ema_fast: round_to(snapshot.ema_fast, 4),
            ema_slow: round_to(snapshot.ema_slow, 4),
            macd_line: round_to(snapshot.macd_line, 4),
            macd_signal: round_to(snapshot.macd_signal, 4),
            macd_histogram: round_to(snapshot.macd_histogram, 4),
            bb_upper: round_to(snapshot.bb_upper, 4),
            bb_mid: round_to(snapshot.bb_mid, 4),
            bb_lower: round_to(snapshot.bb_lower, 4),
        }
    }
}
