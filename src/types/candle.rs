use super::Provenance;
use serde::{Deserialize, Serialize};

/// OHLC candle as returned by the market-data provider.
///
/// Only `close` is required; providers that omit the other fields still
/// yield a usable closing-price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix timestamp (seconds) of the candle open.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    pub close: f64,
}

/// Response for the candle history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub status: String,
    pub data: Vec<Candle>,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
