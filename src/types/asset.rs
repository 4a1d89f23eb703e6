use serde::Serialize;

/// Instrument identifier that requests a batch across the whole universe.
pub const ALL_INSTRUMENTS: &str = "ALL";

/// Instruments the engine will produce signals for in batch mode.
pub const INSTRUMENTS: &[&str] = &[
    // Major forex
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCAD", "USDCHF", "NZDUSD",
    "EURGBP", "EURJPY", "GBPJPY", "AUDJPY", "EURAUD", "EURCHF", "GBPAUD",
    // OTC forex
    "EURUSD-OTC", "GBPUSD-OTC", "USDJPY-OTC", "AUDUSD-OTC", "USDCAD-OTC",
    "EURGBP-OTC", "EURJPY-OTC", "GBPJPY-OTC", "NZDUSD-OTC", "USDCHF_OTC",
    "NZDCHF_OTC", "CADCHF_OTC", "NZDJPY_OTC", "AUDNZD_OTC", "EURSGD_OTC",
    // Exotics
    "USDCOP-OTC", "USDCOP_OTC", "BRLUSD-OTC", "USDBRL_OTC", "USDARS-OTC",
    "USDARS_OTC", "USDTRY-OTC", "USDTRY_OTC", "USDBDT-OTC", "USDBDT_OTC",
    "USDMXN-OTC", "USDMXN_OTC", "USDINR-OTC", "USDINR_OTC", "USDPKR-OTC",
    "USDPKR_OTC", "USDZAR-OTC", "USDZAR_OTC", "USDNGN-OTC", "USDNGN_OTC",
    "USDEGP_OTC", "USDPHP_OTC", "USDIDR_OTC", "USDDZD_OTC",
    // Commodities
    "GOLD-OTC", "SILVER-OTC", "OIL-OTC", "COPPER-OTC", "UKBR_OTC", "USCR_OTC",
    // Indices
    "US500-OTC", "US100-OTC", "US30-OTC", "UK100-OTC", "GER30-OTC", "FTSGBP_OTC",
    // Crypto
    "BTCUSD-OTC", "ETHUSD-OTC", "LTCUSD-OTC", "XRPUSD-OTC", "SHIBA_OTC",
    "PEPE_OTC", "TRUMP_OTC", "DOGWIF_OTC", "BONK_OTC", "FLOKI_OTC", "DOGE_OTC",
    // Stocks
    "AAPL-OTC", "GOOGL-OTC", "MSFT-OTC", "MSFT_OTC", "AMZN-OTC", "TSLA-OTC",
    "MCD-OTC", "MCD_OTC", "BOEING_OTC", "FB-OTC", "INTC_OTC", "AXP_OTC",
];

/// Response for the instrument listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AssetsResponse {
    pub status: &'static str,
    pub assets: &'static [&'static str],
    pub total: usize,
}

impl AssetsResponse {
    pub fn all() -> Self {
        Self {
            status: "success",
            assets: INSTRUMENTS,
            total: INSTRUMENTS.len(),
        }
    }
}
