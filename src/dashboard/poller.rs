// StatusPoller: immediate fetch+render, then every POLL_INTERVAL until stopped.
// Each cycle runs as its own task; a cycle only renders if it is newer than the
// last rendered one, so a slow response never overwrites a newer render.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Duration, MissedTickBehavior, interval};

use super::document::Document;
use super::render::Renderer;
use super::source::{PollError, StatusSource};

pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// What a single poll cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered,
    /// A newer cycle had already rendered; this response was dropped.
    Superseded,
    /// Fetch or render failed; logged, document left as it was.
    Failed,
}

struct PollContext<S, D> {
    source: S,
    document: Arc<Mutex<D>>,
    renderer: Renderer,
    issued: AtomicU64,
    /// Only written while holding the document lock.
    rendered: AtomicU64,
}

impl<S: StatusSource, D: Document> PollContext<S, D> {
    fn next_sequence(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn run_cycle(&self, seq: u64) -> CycleOutcome {
        match self.fetch_and_render(seq).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, seq, operation = "fetch_status", "Error fetching status");
                CycleOutcome::Failed
            }
        }
    }

    async fn fetch_and_render(&self, seq: u64) -> Result<CycleOutcome, PollError> {
        let status = self.source.fetch().await?;

        let mut doc = self.document.lock().await;
        let last = self.rendered.load(Ordering::Relaxed);
        if seq <= last {
            tracing::debug!(seq, last_rendered = last, "Discarding superseded status response");
            return Ok(CycleOutcome::Superseded);
        }
        self.renderer.render_status(&mut *doc, &status)?;
        self.rendered.store(seq, Ordering::Relaxed);
        if let Err(e) = doc.commit() {
            tracing::warn!(error = %e, seq, operation = "commit", "Failed to commit rendered page");
        }
        tracing::debug!(
            seq,
            devices = status.computers.len(),
            online = status.stats.online,
            "Status rendered"
        );
        Ok(CycleOutcome::Rendered)
    }
}

struct Running {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the polling timer. Dropping the poller aborts the timer task.
pub struct StatusPoller<S, D> {
    ctx: Arc<PollContext<S, D>>,
    running: Option<Running>,
}

impl<S: StatusSource, D: Document> StatusPoller<S, D> {
    pub fn new(source: S, document: D, renderer: Renderer) -> Self {
        Self {
            ctx: Arc::new(PollContext {
                source,
                document: Arc::new(Mutex::new(document)),
                renderer,
                issued: AtomicU64::new(0),
                rendered: AtomicU64::new(0),
            }),
            running: None,
        }
    }

    pub fn document(&self) -> Arc<Mutex<D>> {
        self.ctx.document.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.handle.is_finished())
    }

    /// Starts polling: the first cycle is issued immediately, then one every
    /// [`POLL_INTERVAL`]. Calling `start` on a running poller does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!("Status poller already running");
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ctx = self.ctx.clone();
        let handle = tokio::spawn(async move {
            let mut tick = interval(POLL_INTERVAL);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut cycles = JoinSet::new();
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let ctx = ctx.clone();
                        let seq = ctx.next_sequence();
                        cycles.spawn(async move { ctx.run_cycle(seq).await });
                    }
                    Some(result) = cycles.join_next() => {
                        if let Err(e) = result {
                            tracing::warn!(error = %e, "Poll cycle task failed");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Status poller shutting down");
                        break;
                    }
                }
            }
            cycles.shutdown().await;
        });
        tracing::info!(interval_ms = POLL_INTERVAL.as_millis() as u64, "Status poller started");
        self.running = Some(Running {
            shutdown_tx,
            handle,
        });
    }

    /// Stops the timer and aborts in-flight cycles. No render happens after
    /// this returns.
    pub async fn stop(&mut self) {
        let Some(Running {
            shutdown_tx,
            handle,
        }) = self.running.take()
        else {
            return;
        };
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Status poller task failed");
        }
        tracing::info!("Status poller stopped");
    }

    /// Runs one cycle right now, outside the timer. Errors are logged, not returned.
    pub async fn fetch_status(&self) -> CycleOutcome {
        let seq = self.ctx.next_sequence();
        self.ctx.run_cycle(seq).await
    }
}

impl<S, D> Drop for StatusPoller<S, D> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}
