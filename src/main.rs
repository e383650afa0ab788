mod app;
mod auth;
mod config;
mod db;
mod error;
mod points;
mod state;
mod storage;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_points=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::debug!(
        jwt_ttl_hours = config.jwt.ttl_hours,
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "configuration loaded"
    );

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let app_state = AppState::init(&config, pool.clone())?;
    app::serve(app::build_app(app_state)).await?;

    pool.close().await;
    Ok(())
}
