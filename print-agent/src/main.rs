use std::sync::Arc;

use print_agent::{AgentConfig, AgentWorker, NetworkPrinter};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "print_agent=info".into()),
        )
        .init();

    let config = AgentConfig::from_env();
    config.validate()?;

    let printer = NetworkPrinter::from_addr(&config.printer_addr)?
        .with_timeout(config.print_timeout());
    tracing::info!(printer = %printer.addr(), "print-agent starting");

    let shutdown = CancellationToken::new();
    let worker = AgentWorker::new(config, Arc::new(printer), shutdown.clone());

    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down...");
        signal.cancel();
    });

    worker.run().await?;
    Ok(())
}
