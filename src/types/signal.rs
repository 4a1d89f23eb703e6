use serde::{Deserialize, Serialize};

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Price expected to rise.
    Call,
    /// Price expected to fall.
    Put,
}

/// Where the prices behind a signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Closing prices from the live market-data provider.
    #[serde(rename = "real_api")]
    Live,
    /// Prices from the synthetic random-walk generator.
    #[serde(rename = "advanced_simulation")]
    Simulated,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "real_api",
            Provenance::Simulated => "advanced_simulation",
        }
    }
}

/// Indicator values behind a scored signal, rounded for display.
///
/// RSI is rounded to 2 decimals; everything else to 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_upper: f64,
    pub bb_mid: f64,
    pub bb_lower: f64,
}

/// A single generated signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Instrument identifier (e.g. "EURUSD").
    pub instrument: String,
    pub direction: Direction,
    /// Confidence percentage, 0-95.
    pub confidence: u8,
    /// `None` when the series was too short to score.
    pub indicators: Option<IndicatorSnapshot>,
    pub provenance: Provenance,
    /// Unix timestamp (milliseconds) the signal targets.
    pub target_time: i64,
    /// Target time as "HH:MM" in the caller's display offset.
    pub display_time: String,
}

/// Daily quota figures attached to every signal response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub daily_count: u32,
    pub daily_limit: u32,
    pub remaining: u32,
}

impl QuotaStatus {
    pub fn new(daily_count: u32, daily_limit: u32) -> Self {
        Self {
            daily_count,
            daily_limit,
            remaining: daily_limit.saturating_sub(daily_count),
        }
    }
}

/// Wire form of a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalPayload {
    pub pair: String,
    pub dir: Direction,
    pub confidence: u8,
    pub time: String,
    pub ts: i64,
    /// Empty object when the series was too short to score.
    pub indicators: serde_json::Value,
    pub source: Provenance,
}

impl From<&Signal> for SignalPayload {
    fn from(signal: &Signal) -> Self {
        let indicators = match &signal.indicators {
            Some(snapshot) => serde_json::to_value(snapshot).unwrap_or_default(),
            None => serde_json::Value::Object(serde_json::Map::new()),
        };

        Self {
            pair: signal.instrument.clone(),
            dir: signal.direction,
            confidence: signal.confidence,
            time: signal.display_time.clone(),
            ts: signal.target_time,
            indicators,
            source: signal.provenance,
        }
    }
}

/// Response for a single-instrument signal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    pub status: String,
    #[serde(flatten)]
    pub signal: SignalPayload,
    #[serde(flatten)]
    pub quota: QuotaStatus,
}

/// Response for a batch (`ALL`) signal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub status: String,
    pub signals: Vec<SignalPayload>,
    #[serde(flatten)]
    pub quota: QuotaStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signal(indicators: Option<IndicatorSnapshot>) -> Signal {
        Signal {
            instrument: "EURUSD".to_string(),
            direction: Direction::Call,
            confidence: 80,
            indicators,
            provenance: Provenance::Simulated,
            target_time: 1_700_000_060_000,
            display_time: "22:14".to_string(),
        }
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Call).unwrap(), "\"CALL\"");
        assert_eq!(serde_json::to_string(&Direction::Put).unwrap(), "\"PUT\"");
    }

    #[test]
    fn test_provenance_serialization() {
        assert_eq!(serde_json::to_string(&Provenance::Live).unwrap(), "\"real_api\"");
        assert_eq!(
            serde_json::to_string(&Provenance::Simulated).unwrap(),
            "\"advanced_simulation\""
        );
        assert_eq!(Provenance::Simulated.as_str(), "advanced_simulation");
    }

    #[test]
    fn test_quota_status_remaining_saturates() {
        assert_eq!(QuotaStatus::new(3, 12).remaining, 9);
        assert_eq!(QuotaStatus::new(15, 12).remaining, 0);
    }

    #[test]
    fn test_signal_response_flattens_fields() {
        let signal = sample_signal(None);
        let response = SignalResponse {
            status: "success".to_string(),
            signal: SignalPayload::from(&signal),
            quota: QuotaStatus::new(1, 14),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["pair"], "EURUSD");
        assert_eq!(json["dir"], "CALL");
        assert_eq!(json["time"], "22:14");
        assert_eq!(json["ts"], 1_700_000_060_000i64);
        assert_eq!(json["source"], "advanced_simulation");
        assert_eq!(json["daily_count"], 1);
        assert_eq!(json["daily_limit"], 14);
        assert_eq!(json["remaining"], 13);
        assert!(json["indicators"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_payload_carries_snapshot() {
        let snapshot = IndicatorSnapshot {
            rsi: 41.25,
            ema_fast: 1.0012,
            ema_slow: 1.0009,
            macd_line: 0.0003,
            macd_signal: 0.0003,
            macd_histogram: 0.0,
            bb_upper: 1.003,
            bb_mid: 1.001,
            bb_lower: 0.999,
        };
        let payload = SignalPayload::from(&sample_signal(Some(snapshot)));

        assert_eq!(payload.indicators["rsi"], 41.25);
        assert_eq!(payload.indicators["bb_lower"], 0.999);
    }
}
