//! Coordinator server entry point: parse CLI args, load config, wire up the
//! store/coordinator/background tasks, and serve HTTP + WebSocket.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use holdem_coordinator::cli::ServerCli;
use holdem_coordinator::config::Config;
use holdem_coordinator::coordinator::{run_sweeper, run_timers, CoordinatorState};
use holdem_coordinator::http::build_router;
use holdem_coordinator::store::{SledStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ServerCli::parse();

    let mut cfg = Config::load_or_create(&cli.config)
        .with_context(|| format!("loading or creating config '{}'", cli.config.display()))?;

    if let Some(addr) = cli.bind_addr.clone() {
        cfg.bind_addr = addr;
    }
    if cli.persist {
        cfg.save(&cli.config)
            .with_context(|| format!("saving updated config '{}'", cli.config.display()))?;
    }

    let default_filter = if cli.debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store: Arc<dyn Store> = Arc::new(
        SledStore::open(&cfg.data_dir)
            .with_context(|| format!("opening sled database at '{}'", cfg.data_dir))?,
    );
    let state = CoordinatorState::new(store);

    tokio::spawn(run_timers(state.clone()));
    tokio::spawn(run_sweeper(
        state.clone(),
        cfg.idle_retention_seconds,
        cfg.ended_retention_seconds,
    ));

    let addr: SocketAddr = cfg
        .bind_addr
        .parse()
        .with_context(|| format!("parsing bind address '{}'", cfg.bind_addr))?;

    let app = build_router(state);
    tracing::info!(%addr, "starting coordinator");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
