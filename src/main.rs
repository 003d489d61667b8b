mod alerts;
mod analytics;
mod animals;
mod app;
mod auth;
mod config;
mod dashboard;
mod date_utils;
mod domain;
mod error;
mod production;
mod reports;
mod reproduction;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "herdbook=debug,axum=info,tower_http=info".to_string());
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

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    tracing::info!(
        utc_offset_hours = app_state.config.herd.utc_offset_hours,
        service_window_days = app_state.config.herd.service_window_days,
        "herd settings loaded"
    );

    app::serve(app::build_app(app_state)).await
}
