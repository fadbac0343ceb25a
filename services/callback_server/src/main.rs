//! Callback server entry point

use anyhow::{Context, Result};
use apphost_config::HostConfig;
use apphost_pubsub::Subscription;
use apphost_server::{telemetry, topic_handlers, AppContext, AppServer};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    bind_address: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter used when RUST_LOG is unset (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = HostConfig::load(args.config.as_deref())?;
    if let Some(bind_address) = args.bind_address {
        config.server.bind_address = bind_address;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.server.log_level = log_level;
    }

    telemetry::init_tracing(&config.server.log_level, config.server.log_format)?;

    info!("Starting application callback server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::from_config(&config);
    for declared in &config.subscriptions {
        let mut subscription = Subscription::new(
            declared.pubsub_name.clone(),
            declared.topic.clone(),
            declared.route.clone(),
        );
        subscription.metadata = declared.metadata.clone();

        if let Err(e) = ctx.subscribe(&subscription, topic_handlers::log_event) {
            warn!(
                "Skipping configured subscription {}/{}: {}",
                declared.pubsub_name, declared.topic, e
            );
        }
    }

    let addr = config.socket_addr()?;
    AppServer::new(ctx)
        .serve(addr, shutdown_signal())
        .await
        .context("Callback server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
