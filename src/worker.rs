// Background sweeper: evicts agent connections that stopped pinging.

use crate::computer_repo::ComputerRepo;
use crate::models::PresenceStatus;
use crate::notifier::TelegramNotifier;
use crate::registry::ConnectionRegistry;
use std::sync::Arc;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

/// Registry, store and notifier the sweeper works on, plus its shutdown signal.
pub struct WorkerDeps {
    pub registry: Arc<ConnectionRegistry>,
    pub computer_repo: Arc<ComputerRepo>,
    pub notifier: TelegramNotifier,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    pub cleanup_interval_secs: u64,
    /// Connections idle longer than this are evicted.
    pub stale_after_secs: u64,
}

/// One sweep: evict stale connections, mark them offline and notify.
/// Returns the evicted names.
pub async fn run_sweep(
    registry: &ConnectionRegistry,
    computer_repo: &ComputerRepo,
    notifier: &TelegramNotifier,
    stale_after: Duration,
) -> Vec<String> {
    let evicted = registry.evict_stale(stale_after).await;
    for name in &evicted {
        tracing::warn!(agent = %name, "Removing stale connection");
        settle_evicted(registry, computer_repo, notifier, name).await;
    }
    evicted
}

/// Marks an evicted agent offline and notifies, unless it has registered
/// again since the eviction. A reconnect owns the stored status from then on.
pub async fn settle_evicted(
    registry: &ConnectionRegistry,
    computer_repo: &ComputerRepo,
    notifier: &TelegramNotifier,
    name: &str,
) {
    if registry.is_online(name).await {
        tracing::debug!(agent = %name, "Agent reconnected after eviction; keeping it online");
        return;
    }
    if let Err(e) = computer_repo
        .update_status(name, PresenceStatus::Offline)
        .await
    {
        tracing::warn!(
            error = %e,
            agent = %name,
            operation = "update_status",
            "Failed to mark stale agent offline"
        );
    }
    notifier.agent_timed_out(name).await;
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        registry,
        computer_repo,
        notifier,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        cleanup_interval_secs,
        stale_after_secs,
    } = config;

    let cleanup_interval = Duration::from_secs(cleanup_interval_secs);
    let stale_after = Duration::from_secs(stale_after_secs);

    let worker_span = tracing::span!(tracing::Level::DEBUG, "sweeper", cleanup_interval_secs);

    tokio::spawn(
        async move {
            // First sweep after one full interval, not at startup.
            let mut tick = interval_at(Instant::now() + cleanup_interval, cleanup_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let evicted = run_sweep(&registry, &computer_repo, &notifier, stale_after).await;
                        let online = registry.len().await;
                        tracing::debug!(evicted = evicted.len(), online, "sweep complete");
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Sweeper shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}
