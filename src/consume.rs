//! Consume command handler.
//!
//! Wires CLI arguments to the consumption loop: connect the store, install
//! the shutdown signal, hand off to `order-pipeline`.

use anyhow::{Context, Result};
use clap::Parser;
use inventory_store::PostgresStore;
use tokio::sync::watch;

/// Inventory store connection options.
#[derive(Debug, Clone, Parser)]
pub struct StoreOpts {
    /// PostgreSQL connection string
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: String,
}

/// Run the consumption loop until SIGINT or the configured message bound.
pub async fn run(config: order_pipeline::Config, store_opts: StoreOpts) -> Result<()> {
    tracing::info!("Starting order consumption");

    let mut store = PostgresStore::connect(&store_opts.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    // The loop only observes this between messages, so an in-flight message
    // always reaches its finalize decision before the process exits.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("SIGINT received, finishing in-flight message before exit");
            let _ = shutdown_tx.send(true);
        }
    });

    order_pipeline::run_consumer_loop(&mut store, config, shutdown_rx).await
}
