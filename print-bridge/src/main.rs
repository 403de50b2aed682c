use print_bridge::{Config, Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    let _log_guard = setup_environment(&config);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        anyhow::bail!(e);
    }

    tracing::info!("print-bridge starting (env: {})", config.environment);

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
