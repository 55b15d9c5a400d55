//! Host-facing API for the extractor enforcement plugin.
//!
//! This crate carries only what the host glue and the plugin share: stable
//! identifiers, the typed event system the host dispatches world events
//! through, the collaborator traits the plugin consumes (world queries,
//! device control, player chat), and the plugin lifecycle trait. Game logic
//! lives in the plugin crate.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

pub mod config_store;

pub use config_store::{ConfigError, JsonConfigStore};

// ============================================================================
// Core Types
// ============================================================================

/// Stable identifier of a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network identifier of a placed device entity. Assigned by the host world;
/// stable for the lifetime of the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Traits and Core Infrastructure
// ============================================================================

pub trait Event: Send + Sync + Any + std::fmt::Debug {
    fn type_name() -> &'static str
    where
        Self: Sized;
    fn serialize(&self) -> Result<Vec<u8>, EventError>;
    fn deserialize(data: &[u8]) -> Result<Self, EventError>
    where
        Self: Sized;
}

impl<T> Event for T
where
    T: Serialize + DeserializeOwned + Send + Sync + Any + std::fmt::Debug + 'static,
{
    fn type_name() -> &'static str {
        std::any::type_name::<T>()
    }

    fn serialize(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(EventError::Serialization)
    }

    fn deserialize(data: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(data).map_err(EventError::Deserialization)
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, data: &[u8]) -> Result<(), EventError>;
    fn handler_name(&self) -> &str;
}

/// Bridges a typed async closure to the untyped [`EventHandler`] interface.
pub struct TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> BoxFuture<'static, Result<(), EventError>> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: std::marker::PhantomData<fn(T)>,
}

impl<T, F> TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> BoxFuture<'static, Result<(), EventError>> + Send + Sync,
{
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> EventHandler for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> BoxFuture<'static, Result<(), EventError>> + Send + Sync,
{
    async fn handle(&self, data: &[u8]) -> Result<(), EventError> {
        let event = T::deserialize(data)?;
        (self.handler)(event).await
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Event System
// ============================================================================

/// Typed publish/subscribe bus the host dispatches through.
///
/// Handlers are async and keyed by `"{category}:{name}"`. Handler failures
/// are logged and never propagated back to the emitter: a misbehaving
/// subscriber must not break event delivery for the rest.
pub struct EventSystem {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    stats: RwLock<EventSystemStats>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            stats: RwLock::new(EventSystemStats::default()),
        }
    }

    /// Register a handler for world entity events (device toggles and the
    /// like, emitted by the host's world simulation).
    pub async fn on_world<T, F, Fut>(&self, event_name: &str, handler: F) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        let event_key = format!("world:{}", event_name);
        self.register_typed_handler(event_key, handler).await
    }

    /// Register a handler for core server lifecycle events.
    pub async fn on_core<T, F, Fut>(&self, event_name: &str, handler: F) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        let event_key = format!("core:{}", event_name);
        self.register_typed_handler(event_key, handler).await
    }

    async fn register_typed_handler<T, F, Fut>(
        &self,
        event_key: String,
        handler: F,
    ) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        let handler_name = format!("{}::{}", event_key, T::type_name());
        let boxed = move |event: T| handler(event).boxed();
        let handler_arc: Arc<dyn EventHandler> = Arc::new(TypedEventHandler::new(handler_name, boxed));

        let mut handlers = self.handlers.write().await;
        handlers
            .entry(event_key.clone())
            .or_insert_with(Vec::new)
            .push(handler_arc);

        let mut stats = self.stats.write().await;
        stats.total_handlers += 1;

        info!("Registered handler for {}", event_key);
        Ok(())
    }

    /// Emit a world entity event.
    pub async fn emit_world<T>(&self, event_name: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = format!("world:{}", event_name);
        self.emit_event(&event_key, event).await
    }

    /// Emit a core server lifecycle event.
    pub async fn emit_core<T>(&self, event_name: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = format!("core:{}", event_name);
        self.emit_event(&event_key, event).await
    }

    async fn emit_event<T>(&self, event_key: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let data = event.serialize()?;
        let handlers = self.handlers.read().await;

        if let Some(event_handlers) = handlers.get(event_key) {
            debug!("Emitting {} to {} handlers", event_key, event_handlers.len());

            for handler in event_handlers {
                if let Err(e) = handler.handle(&data).await {
                    error!("Handler {} failed: {}", handler.handler_name(), e);
                }
            }

            let mut stats = self.stats.write().await;
            stats.events_emitted += 1;
        } else {
            debug!("No handlers for event: {}", event_key);
        }

        Ok(())
    }

    pub async fn get_stats(&self) -> EventSystemStats {
        self.stats.read().await.clone()
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_event_system() -> Arc<EventSystem> {
    Arc::new(EventSystem::new())
}

#[derive(Debug, Default, Clone)]
pub struct EventSystemStats {
    pub total_handlers: usize,
    pub events_emitted: u64,
}

// ============================================================================
// World Events
// ============================================================================

/// A device's engine was switched on or off by a player.
///
/// `engine_on` is the state the device ended up in, `prefab` is the device's
/// prefab short name as the world reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorToggledEvent {
    pub device_id: DeviceId,
    pub prefab: String,
    pub player_id: PlayerId,
    pub engine_on: bool,
}

// ============================================================================
// Collaborator Interfaces
// ============================================================================

/// Live world queries and device control, implemented by the host.
///
/// Lookups return `None` for devices that no longer exist in the world;
/// callers decide what absence means for them.
#[async_trait]
pub trait WorldAccess: Send + Sync {
    /// Identifiers of every device entity currently in the world.
    async fn device_ids(&self) -> Vec<DeviceId>;

    /// The device's prefab short name, if it still exists.
    async fn prefab_name(&self, device: DeviceId) -> Option<String>;

    /// The device's current engine state, if it still exists.
    async fn engine_on(&self, device: DeviceId) -> Option<bool>;

    /// Force the device's engine off.
    async fn force_engine_off(&self, device: DeviceId) -> Result<(), WorldError>;
}

/// Server services handed to plugins at registration time.
#[async_trait]
pub trait ServerContext: Send + Sync {
    fn events(&self) -> Arc<EventSystem>;
    fn world(&self) -> Arc<dyn WorldAccess>;
    fn log(&self, level: LogLevel, message: &str);

    /// The locale the player's client reports, if known.
    fn player_locale(&self, player_id: PlayerId) -> Option<String>;

    /// Deliver a chat message to a specific player.
    async fn send_chat(&self, player_id: PlayerId, text: &str) -> Result<(), WorldError>;
}

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// ============================================================================
// Plugin Lifecycle
// ============================================================================

/// Lifecycle contract for plugins hosted on this API.
///
/// `register_handlers` runs before the server starts dispatching events;
/// `on_init` runs once the world is up, `on_shutdown` as the server stops.
#[async_trait]
pub trait SimplePlugin: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    async fn register_handlers(
        &mut self,
        events: Arc<EventSystem>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError>;

    async fn on_init(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }

    async fn on_shutdown(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),
    #[error("Player not connected: {0}")]
    PlayerNotConnected(PlayerId),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),
}
