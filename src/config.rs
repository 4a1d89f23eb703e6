use std::env;
use std::path::PathBuf;

/// Live market-data provider configuration.
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    /// Base URL of the market-data API.
    pub base_url: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
    /// Timeout for a whole live fetch (ms).
    pub timeout_ms: u64,
}

impl MarketDataConfig {
    /// Whether enough is configured to attempt live fetches.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.email.is_some() && self.password.is_some()
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            password: None,
            timeout_ms: 5_000,
        }
    }
}

/// Daily signal quota configuration.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// File holding the persisted daily counter.
    pub counter_path: PathBuf,
    /// Reject requests once the daily limit is reached.
    pub enforce: bool,
    /// Maximum signals generated by one batch request.
    pub batch_cap: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            counter_path: PathBuf::from("daily_signals.json"),
            enforce: false,
            batch_cap: 10,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Live market-data provider.
    pub market_data: MarketDataConfig,
    /// Daily quota settings.
    pub quota: QuotaConfig,
    /// Number of prices requested per signal when the caller gives none.
    pub default_window: usize,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let market_defaults = MarketDataConfig::default();
        let quota_defaults = QuotaConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            market_data: MarketDataConfig {
                base_url: env::var("MARKET_DATA_URL").ok().filter(|v| !v.is_empty()),
                email: env::var("MARKET_DATA_EMAIL").ok().filter(|v| !v.is_empty()),
                password: env::var("MARKET_DATA_PASSWORD").ok().filter(|v| !v.is_empty()),
                timeout_ms: env::var("MARKET_DATA_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(market_defaults.timeout_ms),
            },
            quota: QuotaConfig {
                counter_path: env::var("SIGNAL_COUNTER_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(quota_defaults.counter_path),
                enforce: env::var("ENFORCE_DAILY_LIMIT")
                    .ok()
                    .map(|v| parse_bool(&v))
                    .unwrap_or(quota_defaults.enforce),
                batch_cap: env::var("BATCH_SIGNAL_CAP")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(quota_defaults.batch_cap),
            },
            default_window: env::var("SIGNAL_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            market_data: MarketDataConfig::default(),
            quota: QuotaConfig::default(),
            default_window: 30,
        }
    }
}
