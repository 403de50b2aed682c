//! Bridge state shared by every request handler

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::connection::ConnectionManager;
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::dispatch::DispatchRouter;
use crate::recorder::LogRecorder;
use crate::registry::DeviceRegistry;
use crate::storage::BridgeStorage;

/// Upper bound on how often finished jobs are pruned
const MAX_PRUNE_PERIOD: Duration = Duration::from_secs(60);

/// Cheap to clone; every component sits behind an `Arc`
#[derive(Clone)]
pub struct BridgeState {
    pub config: Arc<Config>,
    pub storage: BridgeStorage,
    pub registry: Arc<DeviceRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub router: DispatchRouter,
    pub recorder: Arc<LogRecorder>,
}

impl BridgeState {
    /// Open the database under the work dir and wire up the components
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .with_context(|| format!("Failed to create work dir {}", config.work_dir))?;
        let db_path = config.db_path();
        let storage = BridgeStorage::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        tracing::info!(path = %db_path.display(), "Database opened");
        Ok(Self::with_storage(config, storage))
    }

    pub fn with_storage(config: &Config, storage: BridgeStorage) -> Self {
        let registry = Arc::new(DeviceRegistry::new(storage.clone()));
        let connections = Arc::new(ConnectionManager::new(
            registry.clone(),
            config.ack_timeout(),
            config.heartbeat_interval(),
        ));
        let recorder = Arc::new(LogRecorder::new(
            storage.clone(),
            config.log_persist_retries,
        ));
        let router = DispatchRouter::new(registry.clone(), connections.clone(), recorder.clone());

        Self {
            config: Arc::new(config.clone()),
            storage,
            registry,
            connections,
            router,
            recorder,
        }
    }

    /// Spawn the heartbeat reaper and the finished-job pruner
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let connections = self.connections.clone();
        let token = tasks.shutdown_token();
        tasks.spawn("heartbeat_reaper", TaskKind::Periodic, async move {
            connections.run_reaper(token).await;
        });

        let router = self.router.clone();
        let retention = self.config.job_retention();
        let token = tasks.shutdown_token();
        tasks.spawn("job_pruner", TaskKind::Periodic, async move {
            let period = retention.clamp(Duration::from_secs(1), MAX_PRUNE_PERIOD);
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        router.prune_finished(retention);
                    }
                }
            }
        });

        tasks.log_summary();
        tasks
    }

    /// Stop dispatching and close every device channel
    pub fn shutdown(&self) {
        self.router.shutdown();
        self.connections.close_all();
    }
}
