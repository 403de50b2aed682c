//! HTTP server startup and shutdown

use std::future::Future;

use tokio::net::TcpListener;

use crate::api;
use crate::core::{BridgeState, Config};

pub struct Server {
    config: Config,
    state: Option<BridgeState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: BridgeState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Bind `0.0.0.0:HTTP_PORT` and serve until ctrl-c
    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => BridgeState::initialize(&self.config)?,
        };

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("print-bridge listening on {addr} (env: {})", self.config.environment);

        serve(listener, state, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await
    }
}

/// Serve the bridge on an already bound listener until `signal` resolves
///
/// Device channels are closed as soon as the signal fires so that open
/// WebSocket sessions do not hold up the graceful shutdown.
pub async fn serve<S>(listener: TcpListener, state: BridgeState, signal: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let tasks = state.start_background_tasks();
    let app = api::build_router(state.clone());

    let on_signal = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            on_signal.shutdown();
        })
        .await?;

    state.shutdown();
    tasks.shutdown().await;
    Ok(())
}
