//! Periodic reconciliation of the registry against live world state.
//!
//! Toggle notifications can be lost (a quarry blown up mid-run never emits
//! its off toggle). The sweep re-queries every recorded device and prunes
//! records whose device is gone or no longer running, so registry drift is
//! bounded by one sweep period.

use crate::tracker::ExtractorTracker;
use crate::types::ExtractorKind;
use extractor_events::WorldAccess;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// One reconciliation pass.
///
/// A device that no longer resolves in the world counts as engine-off, and
/// a recorded device whose prefab no longer classifies as an extractor is
/// pruned as well (defensive, should not occur). Runs under the tracker
/// lock so a concurrent toggle cannot interleave with the pruning decision.
pub async fn sweep_once(tracker: &ExtractorTracker, world: &dyn WorldAccess) {
    let mut state = tracker.state().lock().await;

    let mut kept = Vec::with_capacity(state.records.len());
    for record in state.records.drain(..) {
        let still_on = match world.prefab_name(record.extractor_id).await {
            None => false,
            Some(prefab) if !ExtractorKind::classify(&prefab).is_tracked() => false,
            Some(_) => world
                .engine_on(record.extractor_id)
                .await
                .unwrap_or(false),
        };

        if still_on {
            kept.push(record);
        } else {
            debug!(
                "Pruning stale record for extractor {} (player {})",
                record.extractor_id, record.player_id
            );
        }
    }
    state.records = kept;
}

/// Handle to the repeating sweep task.
///
/// `start` is a no-op while a sweep is already running; `stop` is
/// idempotent and safe to call on a never-started task.
pub struct SweepTask {
    stop_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepTask {
    pub fn new() -> Self {
        Self {
            stop_tx: None,
            handle: None,
        }
    }

    pub fn start(
        &mut self,
        tracker: Arc<ExtractorTracker>,
        world: Arc<dyn WorldAccess>,
        period: Duration,
    ) {
        if self.stop_tx.is_some() {
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep_once(&tracker, world.as_ref()).await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Sweep task stopped");
        });

        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
        info!("Sweep task started (period {:?})", period);
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            info!("Sweep task stopping");
        }
        // The task exits on the signal; nothing to join synchronously.
        self.handle.take();
    }
}

impl Default for SweepTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.stop();
    }
}
