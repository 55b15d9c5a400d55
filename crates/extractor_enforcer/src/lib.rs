//! Single-extractor enforcement plugin.
//!
//! Enforces players only being able to run a single quarry and/or pump jack
//! at a time. A registry maps each active extractor to the player who
//! switched it on; a duplicate activation is reversed (engine forced off)
//! and the player is warned in chat. A periodic sweep reconciles the
//! registry against live world state so missed toggles self-heal.

use async_trait::async_trait;
use extractor_events::{
    EventSystem, ExtractorToggledEvent, JsonConfigStore, LogLevel, PluginError, ServerContext,
    SimplePlugin,
};
use std::sync::Arc;

pub mod config;
pub mod messages;
pub mod reconciler;
pub mod tracker;
pub mod types;

pub use config::EnforcerConfig;
pub use messages::{MessageCatalog, WARNING_MESSAGE_KEY};
pub use reconciler::{sweep_once, SweepTask, SWEEP_PERIOD};
pub use tracker::ExtractorTracker;
pub use types::{ExtractorKind, ExtractorRecord, PUMP_JACK_PREFABS, QUARRY_PREFABS};

/// World event name this plugin subscribes to.
pub const EXTRACTOR_TOGGLED_EVENT: &str = "extractor_toggled";

/// The plugin: wires the tracker to the event bus and owns the sweep task.
///
/// The registry is process-lifetime state, empty at startup and discarded
/// at shutdown; only the one-field config is persisted.
pub struct ExtractorEnforcerPlugin {
    config_store: JsonConfigStore,
    messages: MessageCatalog,
    tracker: Option<Arc<ExtractorTracker>>,
    sweep: SweepTask,
}

impl ExtractorEnforcerPlugin {
    pub fn new(config_store: JsonConfigStore) -> Self {
        Self {
            config_store,
            messages: MessageCatalog::with_defaults(),
            tracker: None,
            sweep: SweepTask::new(),
        }
    }

    /// Replace the message catalog, e.g. with host-supplied translations.
    /// Takes effect for handlers registered afterwards.
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// The live tracker, once handlers have been registered.
    pub fn tracker(&self) -> Option<Arc<ExtractorTracker>> {
        self.tracker.clone()
    }
}

#[async_trait]
impl SimplePlugin for ExtractorEnforcerPlugin {
    fn name(&self) -> &str {
        "extractor_enforcer"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn register_handlers(
        &mut self,
        events: Arc<EventSystem>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError> {
        let tracker = Arc::new(ExtractorTracker::new(context, self.messages.clone()));
        self.tracker = Some(tracker.clone());

        events
            .on_world(
                EXTRACTOR_TOGGLED_EVENT,
                move |event: ExtractorToggledEvent| {
                    let tracker = tracker.clone();
                    async move {
                        tracker.handle_toggle(&event).await;
                        Ok(())
                    }
                },
            )
            .await
            .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;

        Ok(())
    }

    async fn on_init(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        let tracker = self.tracker.clone().ok_or_else(|| {
            PluginError::InitializationFailed("handlers were never registered".to_string())
        })?;

        let config: EnforcerConfig = self.config_store.load_or_default().await;
        tracker.apply_config(config).await;

        self.sweep.start(tracker, context.world(), SWEEP_PERIOD);

        context.log(
            LogLevel::Info,
            "ExtractorEnforcer: enforcement active, sweep running",
        );
        Ok(())
    }

    async fn on_shutdown(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        self.sweep.stop();
        context.log(LogLevel::Info, "ExtractorEnforcer: shut down");
        Ok(())
    }
}
