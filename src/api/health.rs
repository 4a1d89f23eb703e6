use crate::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;

const SERVICE_NAME: &str = "SIGNAL ENGINE";
const FEATURES: &[&str] = &["RSI", "MACD", "EMA", "Bollinger Bands", "Multi-Asset Analysis"];

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    features: &'static [&'static str],
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        features: FEATURES,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_status_lists_indicators() {
        let Json(response) = status().await;
        assert_eq!(response.status, "online");
        assert!(response.features.contains(&"RSI"));
        assert!(response.features.contains(&"Bollinger Bands"));
    }
}
