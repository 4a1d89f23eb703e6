use signal_engine::config::Config;
use signal_engine::{app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Starting signal engine on {}:{}", config.host, config.port);

    if config.quota.enforce {
        info!("Daily signal limit enforced");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::from_config(config);

    if state.orchestrator.is_live() {
        info!("Signals use live market data with synthetic fallback");
    } else {
        info!("Signals use synthetic prices");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
