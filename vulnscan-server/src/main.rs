use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vulnscan_server::{
    create_app,
    infra::{
        app_state::AppState,
        config::Config,
        queue::{self, DEFAULT_QUEUE_CAPACITY, QueueEnqueuer},
        store::InMemoryScanJobStore,
        trivy::TrivyVersionProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment and flags still apply.
    let _ = dotenvy::dotenv();

    let config = Config::parse();
    init_tracing(&config.log_level);

    config.validate().context("invalid configuration")?;
    info!(
        addr = %config.api.addr,
        metrics_enabled = config.api.metrics_enabled,
        trivy = %config.trivy.path.display(),
        job_ttl = %humantime::format_duration(config.store.job_ttl),
        "starting vulnscan-server"
    );

    let store = Arc::new(InMemoryScanJobStore::new());
    let (enqueuer, tasks) =
        QueueEnqueuer::new(store.clone(), DEFAULT_QUEUE_CAPACITY);
    let version_provider = TrivyVersionProvider::from_config(&config.trivy);

    // Scan execution lives outside this process.
    warn!("no scan worker attached; queued jobs will be failed");
    tokio::spawn(queue::drain_unattended(tasks, store.clone()));
    InMemoryScanJobStore::spawn_retention_sweep(
        store.clone(),
        config.store.job_ttl,
        config.store.sweep_interval,
    );

    let addr = config.api.addr;
    let state = AppState::new(
        config,
        Arc::new(enqueuer),
        store,
        Arc::new(version_provider),
    );
    let app = create_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},tower_http=warn")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
