//! HTTP market-data client.
//!
//! Logs in with email/password for a bearer token, then pulls candles.
//! A 401 on a candle request drops the token so the next `connect`
//! logs in again.

use super::{MarketDataClient, ProviderError};
use crate::config::MarketDataConfig;
use crate::types::Candle;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Candle payloads come either bare or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandlesPayload {
    Bare(Vec<Candle>),
    Wrapped { data: Vec<Candle> },
}

impl CandlesPayload {
    fn into_candles(self) -> Vec<Candle> {
        match self {
            CandlesPayload::Bare(candles) => candles,
            CandlesPayload::Wrapped { data } => data,
        }
    }
}

/// Market-data REST client.
pub struct HttpMarketClient {
    client: Client,
    base_url: String,
    email: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl HttpMarketClient {
    /// Create a client from configuration.
    ///
    /// Returns [`ProviderError::NotConfigured`] unless URL, email and
    /// password are all set.
    pub fn from_config(config: &MarketDataConfig) -> Result<Self, ProviderError> {
        let (Some(base_url), Some(email), Some(password)) =
            (&config.base_url, &config.email, &config.password)
        else {
            return Err(ProviderError::NotConfigured);
        };

        Self::new(
            base_url,
            email,
            password,
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn new(
        base_url: &str,
        email: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("signal-engine/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            password: password.to_string(),
            token: RwLock::new(None),
        })
    }

    async fn login(&self) -> Result<String, ProviderError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth(format!("login rejected ({})", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: LoginResponse = response.json().await?;
        body.token.ok_or_else(|| {
            ProviderError::Auth(
                body.message
                    .unwrap_or_else(|| "login response carried no token".to_string()),
            )
        })
    }
}

#[async_trait]
impl MarketDataClient for HttpMarketClient {
    async fn connect(&self) -> Result<(), ProviderError> {
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let token = self.login().await?;
        info!("Connected to market data provider at {}", self.base_url);
        *self.token.write().await = Some(token);
        Ok(())
    }

    async fn get_candles(
        &self,
        asset: &str,
        period_secs: u32,
        count: usize,
        as_of: i64,
    ) -> Result<Vec<Candle>, ProviderError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or_else(|| ProviderError::Auth("not connected".to_string()))?;

        let url = format!("{}/candles", self.base_url);
        debug!("Fetching {} candles for {} from {}", count, asset, url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("asset", asset.to_string()),
                ("period", period_secs.to_string()),
                ("count", count.to_string()),
                ("time", as_of.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Market data session expired, will re-authenticate");
            *self.token.write().await = None;
            return Err(ProviderError::Auth("session expired".to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let payload: CandlesPayload = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(payload.into_candles())
    }
}
