use std::net::SocketAddr;
use std::sync::Arc;

use booth_api::{app, state::AppState};
use booth_store::{app_config::Config, HttpBoothApi};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booth_api=debug,booth_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Booth API on port {}", config.server.port);

    let upstream = HttpBoothApi::from_config(&config.upstream)?;
    tracing::info!("Upstream API at {}", upstream.base_url());

    let app_state = AppState::new(Arc::new(upstream), &config)?;

    // Idle payment session sweeper
    let sessions = app_state.sessions.clone();
    let ttl = config.payment.session_ttl();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sessions.expire_older_than(ttl).await;
        }
    });

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
