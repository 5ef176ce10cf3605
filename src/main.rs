//! Command-line interface for order-ingest
//!
//! # Usage Examples
//!
//! ## Consume
//! ```bash
//! # Run the consumption loop until SIGINT
//! order-ingest consume \
//!   --brokers localhost:9092 \
//!   --group-id order-ingest \
//!   --topic orders \
//!   --database-url postgres://postgres@localhost/orders
//!
//! # Drain a bounded number of messages (useful in scripts and tests)
//! order-ingest consume --brokers localhost:9092 --topic orders \
//!   --database-url postgres://postgres@localhost/orders --max-messages 100
//! ```
//!
//! ## Submit
//! ```bash
//! # Publish one order event; order ID defaults to a random UUID
//! order-ingest submit --brokers localhost:9092 --topic orders \
//!   --product-id 7 --quantity 2 --unit-price 29.99
//! ```

use clap::{Parser, Subcommand};
use order_ingest::{consume, submit};

#[derive(Parser)]
#[command(name = "order-ingest")]
#[command(about = "Order ingestion pipeline: Kafka order events to a PostgreSQL inventory store")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume order events and apply them to the inventory store
    Consume {
        /// Consumption loop configuration
        #[command(flatten)]
        config: order_pipeline::Config,

        /// Inventory store options
        #[command(flatten)]
        store_opts: consume::StoreOpts,
    },

    /// Publish a single order event (collaborator/testing path)
    Submit {
        #[command(flatten)]
        args: submit::SubmitArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Consume { config, store_opts } => consume::run(config, store_opts).await?,
        Commands::Submit { args } => submit::run(args).await?,
    }

    Ok(())
}
