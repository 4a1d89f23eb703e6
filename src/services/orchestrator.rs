//! Signal generation pipeline.
//!
//! Price provider (live, then synthetic fallback) -> scoring engine ->
//! daily quota counter.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::quota::DailyQuotaTracker;
use crate::services::signals::{Analysis, ScoringEngine};
use crate::sources::{HttpMarketClient, LiveProvider, PriceProvider, PriceSeries, SyntheticProvider};
use crate::types::{
    BatchResponse, Candle, Provenance, QuotaStatus, Signal, SignalPayload, SignalResponse,
    ALL_INSTRUMENTS, INSTRUMENTS,
};

/// Longest accepted timeframe (one day).
pub const MAX_TIMEFRAME_SECS: u32 = 86_400;
/// Largest accepted price window or candle count.
pub const MAX_WINDOW: usize = 500;
/// Accepted display offsets (hours from UTC).
pub const MIN_UTC_OFFSET: i32 = -12;
pub const MAX_UTC_OFFSET: i32 = 14;

/// Parameters for one signal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRequest {
    pub instrument: String,
    pub timeframe_secs: u32,
    pub window: usize,
    pub utc_offset_hours: i32,
}

impl SignalRequest {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            timeframe_secs: 60,
            window: 30,
            utc_offset_hours: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.instrument.trim().is_empty() {
            return Err(AppError::BadRequest("pair must not be empty".to_string()));
        }
        if self.timeframe_secs == 0 || self.timeframe_secs > MAX_TIMEFRAME_SECS {
            return Err(AppError::BadRequest(format!(
                "timeframe must be between 1 and {} seconds",
                MAX_TIMEFRAME_SECS
            )));
        }
        if self.window == 0 || self.window > MAX_WINDOW {
            return Err(AppError::BadRequest(format!(
                "window must be between 1 and {}",
                MAX_WINDOW
            )));
        }
        if !(MIN_UTC_OFFSET..=MAX_UTC_OFFSET).contains(&self.utc_offset_hours) {
            return Err(AppError::BadRequest(format!(
                "tz must be between {} and {}",
                MIN_UTC_OFFSET, MAX_UTC_OFFSET
            )));
        }
        Ok(())
    }
}

/// Build a signal record from an analysis.
///
/// The target time is one timeframe after `now`; the display time shifts
/// it by the caller's UTC offset.
pub fn build_signal(
    request: &SignalRequest,
    analysis: Analysis,
    provenance: Provenance,
    now: DateTime<Utc>,
) -> Signal {
    let target = now + Duration::seconds(i64::from(request.timeframe_secs));
    let local = target + Duration::hours(i64::from(request.utc_offset_hours));

    Signal {
        instrument: request.instrument.clone(),
        direction: analysis.direction,
        confidence: analysis.confidence,
        indicators: analysis.indicators,
        provenance,
        target_time: target.timestamp_millis(),
        display_time: local.format("%H:%M").to_string(),
    }
}

/// Composes providers, scoring and the daily quota.
pub struct SignalOrchestrator {
    live: Option<Arc<dyn PriceProvider>>,
    synthetic: SyntheticProvider,
    engine: ScoringEngine,
    quota: DailyQuotaTracker,
    enforce_quota: bool,
    batch_cap: u32,
}

impl SignalOrchestrator {
    pub fn new(
        live: Option<Arc<dyn PriceProvider>>,
        synthetic: SyntheticProvider,
        quota: DailyQuotaTracker,
        enforce_quota: bool,
        batch_cap: u32,
    ) -> Self {
        Self {
            live,
            synthetic,
            engine: ScoringEngine::new(),
            quota,
            enforce_quota,
            batch_cap,
        }
    }

    /// Wire up the pipeline from configuration.
    pub fn from_config(config: &Config) -> Self {
        let live: Option<Arc<dyn PriceProvider>> = if config.market_data.is_configured() {
            match HttpMarketClient::from_config(&config.market_data) {
                Ok(client) => {
                    info!("Live market data enabled");
                    Some(Arc::new(LiveProvider::new(
                        Arc::new(client),
                        std::time::Duration::from_millis(config.market_data.timeout_ms),
                    )))
                }
                Err(e) => {
                    warn!("Live market data disabled: {}", e);
                    None
                }
            }
        } else {
            info!("No market data credentials, running in simulation mode");
            None
        };

        Self::new(
            live,
            SyntheticProvider::new(),
            DailyQuotaTracker::new(config.quota.counter_path.clone()),
            config.quota.enforce,
            config.quota.batch_cap,
        )
    }

    pub fn quota(&self) -> &DailyQuotaTracker {
        &self.quota
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Closing prices from the live provider, or synthetic ones if it is
    /// unavailable. Never fails.
    pub async fn fetch_prices(&self, instrument: &str, timeframe_secs: u32, window: usize) -> PriceSeries {
        if let Some(live) = &self.live {
            match live.get_prices(instrument, timeframe_secs, window).await {
                Ok(series) => return series,
                Err(e) => warn!("Live prices unavailable for {}, simulating: {}", instrument, e),
            }
        }

        PriceSeries {
            prices: self.synthetic.series(window),
            provenance: Provenance::Simulated,
        }
    }

    /// Recent candles from the live provider, or synthetic ones if it is
    /// unavailable. Never fails.
    pub async fn fetch_candles(
        &self,
        instrument: &str,
        period_secs: u32,
        count: usize,
    ) -> (Vec<Candle>, Provenance) {
        if let Some(live) = &self.live {
            match live.get_candles(instrument, period_secs, count).await {
                Ok(candles) => return (candles, Provenance::Live),
                Err(e) => warn!("Live candles unavailable for {}, simulating: {}", instrument, e),
            }
        }

        (self.synthetic.candles(count, period_secs), Provenance::Simulated)
    }

    /// Score one instrument without touching the quota.
    pub async fn analyze(&self, request: &SignalRequest) -> Signal {
        let series = self
            .fetch_prices(&request.instrument, request.timeframe_secs, request.window)
            .await;
        let analysis = self.engine.analyze(&series.prices, &mut rand::thread_rng());
        debug!(
            "{} -> {:?} ({}%) from {} {} prices",
            request.instrument,
            analysis.direction,
            analysis.confidence,
            series.prices.len(),
            series.provenance.as_str()
        );

        build_signal(request, analysis, series.provenance, Utc::now())
    }

    fn check_quota(&self) -> Result<QuotaStatus> {
        let status = self.quota.status();
        if self.enforce_quota && status.daily_count >= status.daily_limit {
            info!(
                "Daily limit reached ({}/{}), rejecting request",
                status.daily_count, status.daily_limit
            );
            return Err(AppError::QuotaExceeded {
                count: status.daily_count,
                limit: status.daily_limit,
            });
        }
        Ok(status)
    }

    /// Count one generated signal.
    ///
    /// When the quota is enforced the limit check and the increment are a
    /// single step on the tracker, so concurrent requests cannot overshoot.
    fn record(&self, limit: u32) -> Result<u32> {
        if !self.enforce_quota {
            return Ok(self.quota.increment()?);
        }

        match self.quota.increment_within(limit)? {
            Some(count) => Ok(count),
            None => {
                info!("Daily limit reached ({}), discarding generated signal", limit);
                Err(AppError::QuotaExceeded {
                    count: self.quota.read(),
                    limit,
                })
            }
        }
    }

    /// Generate a signal for one instrument and count it against today's quota.
    ///
    /// `ALL` is rejected here; batches go through [`Self::generate_batch`].
    pub async fn generate_signal(&self, request: &SignalRequest) -> Result<SignalResponse> {
        request.validate()?;
        if request.instrument == ALL_INSTRUMENTS {
            return Err(AppError::BadRequest(format!(
                "{} requests a batch, not a single signal",
                ALL_INSTRUMENTS
            )));
        }
        let status = self.check_quota()?;

        let signal = self.analyze(request).await;
        let count = self.record(status.daily_limit)?;

        Ok(SignalResponse {
            status: "success".to_string(),
            signal: SignalPayload::from(&signal),
            quota: QuotaStatus::new(count, status.daily_limit),
        })
    }

    /// Generate signals across a shuffled instrument universe.
    ///
    /// Produces `batch_cap` signals, or fewer when the quota is enforced and
    /// less remains. Each signal is counted individually; a batch that runs
    /// into the limit part way through returns what it already counted.
    pub async fn generate_batch(&self, request: &SignalRequest) -> Result<BatchResponse> {
        request.validate()?;
        let status = self.check_quota()?;

        let batch_cap = if self.enforce_quota {
            status.remaining.min(self.batch_cap)
        } else {
            self.batch_cap
        };
        let batch_size = batch_cap as usize;

        let mut universe = INSTRUMENTS.to_vec();
        universe.shuffle(&mut rand::thread_rng());

        let mut signals = Vec::with_capacity(batch_size);
        for instrument in universe.into_iter().take(batch_size) {
            let single = SignalRequest {
                instrument: instrument.to_string(),
                ..request.clone()
            };
            let signal = self.analyze(&single).await;
            match self.record(status.daily_limit) {
                Ok(_) => signals.push(SignalPayload::from(&signal)),
                Err(AppError::QuotaExceeded { .. }) if !signals.is_empty() => {
                    info!("Quota ran out mid-batch after {} signals", signals.len());
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!("Generated batch of {} signals", signals.len());

        Ok(BatchResponse {
            status: "success".to_string(),
            signals,
            quota: self.quota.status(),
        })
    }
}
