//! QuizDesk Backend Server
//!
//! Loads configuration, opens question storage, wires the explanation queue
//! to the language model client, and serves the HTTP API.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use quizdesk_ai::OpenAiExplanationClient;
use quizdesk_backend::config_helpers::{
    connect_storage, openai_settings_from_config, parse_bind_address, queue_settings_from_config,
};
use quizdesk_backend::state::AppState;

mod cli;
mod config_reloader;
mod tracing_setup;

use cli::CliArgs;
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = load_config(args.config_path.as_deref())?;
    quizdesk_config::validate_config(&config)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let reload_handle = install_tracing_from_config(&config.logging);
    tracing::info!(
        config_path = args.config_path.as_deref().unwrap_or("-"),
        "configuration loaded"
    );

    config_reloader::spawn_config_reloader(
        args.config_path.clone(),
        config.clone(),
        reload_handle,
    );

    let storage = connect_storage(&config).await?;

    let generator = OpenAiExplanationClient::new(openai_settings_from_config(&config.openai))?;
    if !generator.has_api_key() {
        tracing::warn!("no OpenAI API key configured; explanation jobs will fail");
    }
    let settings = queue_settings_from_config(&config.explanations);
    tracing::info!(
        model = %config.openai.model,
        max_retries = settings.max_retries,
        retry_delay_base_ms = settings.retry_delay_base.as_millis() as u64,
        batch_size = settings.batch_size,
        "explanation queue configured"
    );

    let state = Arc::new(AppState::new(storage, Arc::new(generator), settings));
    let app = quizdesk_backend::build_router(state);

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Load configuration from file or defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<quizdesk_config::Config> {
    quizdesk_config::load_config(path)
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received; queued explanation jobs are discarded");
}
