//! The activation registry and the admit/reject rule.

use crate::config::EnforcerConfig;
use crate::messages::{MessageCatalog, WARNING_MESSAGE_KEY};
use crate::types::{ExtractorKind, ExtractorRecord};
use extractor_events::{ExtractorToggledEvent, ServerContext};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub(crate) struct TrackerState {
    pub(crate) records: Vec<ExtractorRecord>,
    pub(crate) config: EnforcerConfig,
}

/// Registry of active extractors plus the enforcement rule.
///
/// All state lives behind one mutex and every toggle is processed while
/// holding it, so the conflict decision and the registry mutation are one
/// atomic unit even on a multi-threaded runtime. Two simultaneous
/// activations by the same player can never both be admitted.
pub struct ExtractorTracker {
    state: Mutex<TrackerState>,
    context: Arc<dyn ServerContext>,
    messages: MessageCatalog,
}

impl ExtractorTracker {
    pub fn new(context: Arc<dyn ServerContext>, messages: MessageCatalog) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                records: Vec::new(),
                config: EnforcerConfig::default(),
            }),
            context,
            messages,
        }
    }

    /// Swap in the loaded configuration. Existing records are kept as-is;
    /// the new rule applies from the next activation attempt.
    pub async fn apply_config(&self, config: EnforcerConfig) {
        self.state.lock().await.config = config;
    }

    /// React to a device engine toggle.
    ///
    /// Deactivations always clear the device's record, no matter which
    /// player sent them. Activations are admitted unless the acting player
    /// already holds a conflicting record, in which case the activation is
    /// reversed and the player is warned.
    pub async fn handle_toggle(&self, event: &ExtractorToggledEvent) {
        let kind = ExtractorKind::classify(&event.prefab);
        if !kind.is_tracked() {
            debug!("Ignoring toggle for untracked prefab {}", event.prefab);
            return;
        }

        let mut state = self.state.lock().await;

        if !event.engine_on {
            state
                .records
                .retain(|r| r.extractor_id != event.device_id);
            debug!("Extractor {} switched off, record cleared", event.device_id);
            return;
        }

        let ignore_kind = state.config.ignore_extractor_kind;
        let conflict = state
            .records
            .iter()
            .any(|r| r.player_id == event.player_id && (ignore_kind || r.kind == kind));

        if conflict {
            // Lock stays held through the reversal so a concurrent toggle
            // cannot observe the half-applied rejection.
            self.reject(event).await;
            return;
        }

        info!(
            "Player {} activated extractor {} ({:?})",
            event.player_id, event.device_id, kind
        );
        state.records.push(ExtractorRecord {
            player_id: event.player_id,
            extractor_id: event.device_id,
            kind,
        });
    }

    /// Reverse a denied activation: engine off first, then the warning.
    async fn reject(&self, event: &ExtractorToggledEvent) {
        info!(
            "Player {} denied a second extractor ({})",
            event.player_id, event.device_id
        );

        if let Err(e) = self.context.world().force_engine_off(event.device_id).await {
            warn!(
                "Failed to force extractor {} off: {}",
                event.device_id, e
            );
        }

        let locale = self
            .context
            .player_locale(event.player_id)
            .unwrap_or_else(|| "en".to_string());
        let text = self.messages.get(WARNING_MESSAGE_KEY, &locale);
        if let Err(e) = self.context.send_chat(event.player_id, text).await {
            warn!("Failed to warn player {}: {}", event.player_id, e);
        }
    }

    /// Snapshot of the current registry.
    pub async fn records(&self) -> Vec<ExtractorRecord> {
        self.state.lock().await.records.clone()
    }

    pub(crate) fn state(&self) -> &Mutex<TrackerState> {
        &self.state
    }
}
