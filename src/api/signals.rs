//! Signal API endpoints.
//!
//! - GET /api/signal - Signal for one instrument, or a batch with `pair=ALL`
//! - GET /api/history - Recent candles for an instrument

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::orchestrator::{MAX_TIMEFRAME_SECS, MAX_WINDOW};
use crate::services::SignalRequest;
use crate::types::{HistoryResponse, Provenance, ALL_INSTRUMENTS};
use crate::AppState;

const DEFAULT_PAIR: &str = "EURUSD";
const DEFAULT_TIMEFRAME_SECS: u32 = 60;
const DEFAULT_HISTORY_COUNT: usize = 30;

/// Query parameters for the signal endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    /// Instrument, or `ALL` for a batch.
    pub pair: Option<String>,
    /// Timeframe in seconds.
    pub timeframe: Option<u32>,
    /// Display offset in hours from UTC.
    pub tz: Option<i32>,
    /// Number of prices to analyze.
    pub window: Option<usize>,
}

/// Query parameters for the history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub pair: Option<String>,
    /// Candle period in seconds.
    pub period: Option<u32>,
    pub count: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/signal", get(get_signal))
        .route("/api/history", get(get_history))
}

fn parse_query<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// GET /api/signal
async fn get_signal(
    State(state): State<AppState>,
    query: std::result::Result<Query<SignalQuery>, QueryRejection>,
) -> Result<Response> {
    let query = parse_query(query)?;

    let request = SignalRequest {
        instrument: query.pair.unwrap_or_else(|| DEFAULT_PAIR.to_string()),
        timeframe_secs: query.timeframe.unwrap_or(DEFAULT_TIMEFRAME_SECS),
        window: query.window.unwrap_or(state.config.default_window),
        utc_offset_hours: query.tz.unwrap_or(0),
    };
    debug!("Signal request: {:?}", request);

    if request.instrument == ALL_INSTRUMENTS {
        let batch = state.orchestrator.generate_batch(&request).await?;
        Ok(Json(batch).into_response())
    } else {
        let signal = state.orchestrator.generate_signal(&request).await?;
        Ok(Json(signal).into_response())
    }
}

/// GET /api/history
async fn get_history(
    State(state): State<AppState>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>> {
    let query = parse_query(query)?;

    let pair = query.pair.unwrap_or_else(|| DEFAULT_PAIR.to_string());
    let period = query.period.unwrap_or(DEFAULT_TIMEFRAME_SECS);
    let count = query.count.unwrap_or(DEFAULT_HISTORY_COUNT);

    if pair.trim().is_empty() || pair == ALL_INSTRUMENTS {
        return Err(AppError::BadRequest("pair must name a single instrument".to_string()));
    }
    if period == 0 || period > MAX_TIMEFRAME_SECS {
        return Err(AppError::BadRequest(format!(
            "period must be between 1 and {} seconds",
            MAX_TIMEFRAME_SECS
        )));
    }
    if count == 0 || count > MAX_WINDOW {
        return Err(AppError::BadRequest(format!("count must be between 1 and {}", MAX_WINDOW)));
    }

    let (data, source) = state.orchestrator.fetch_candles(&pair, period, count).await;

    let response = match source {
        Provenance::Live => HistoryResponse {
            status: "success".to_string(),
            data,
            source,
            message: None,
        },
        Provenance::Simulated => HistoryResponse {
            status: "simulation".to_string(),
            data,
            source,
            message: Some("Running in simulation mode (live market data unavailable)".to_string()),
        },
    };

    Ok(Json(response))
}
