use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use http::{Method, header};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lumera_gateway::config::Config;
use lumera_gateway::services::ratelimit::SWEEP_INTERVAL_SECS;
use lumera_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let app = lumera_gateway::app(state.clone()).layer(cors);

    // The in-memory rate store only frees lapsed windows when swept.
    let sweep_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(SWEEP_INTERVAL_SECS)).await;
            match sweep_state.limiter.sweep(Utc::now()).await {
                Ok(purged) if purged > 0 => {
                    tracing::info!("🧹 Rate-limit sweep purged {} lapsed windows", purged);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("❌ Rate-limit sweep failed: {}", e);
                }
            }
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], 4000));
    tracing::info!("🚀 Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
