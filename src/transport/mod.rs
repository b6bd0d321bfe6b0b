//! Transport contract consumed by the session adapter.
//!
//! The adapter never speaks a broker protocol itself. It drives an already
//! built publish/subscribe client through the narrow [`Transport`] trait and
//! reacts to the lifecycle hooks the client invokes. Reconnect and heartbeat
//! policy belong to the transport; [`TransportOptions`] only carries them.
//!
//! [`MemoryTransport`] is an in-process implementation used by tests and by
//! the `simulate` command.

mod memory;

pub use memory::MemoryTransport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BrokerConfig;

/// Callback invoked for every frame delivered on a subscribed destination.
pub type MessageHandler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Callback invoked when the transport establishes (or re-establishes) a session.
pub type ConnectHook = Arc<dyn Fn(&ConnectFrame) + Send + Sync>;

/// Callback invoked when the transport loses or closes its session.
pub type DisconnectHook = Arc<dyn Fn() + Send + Sync>;

/// A single frame received on, or sent to, a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub destination: String,
    pub body: String,
}

impl Message {
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            body: body.into(),
        }
    }
}

/// Headers the broker sent when acknowledging a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectFrame {
    pub headers: Vec<(String, String)>,
}

impl ConnectFrame {
    /// Look up a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Handle for an active subscription.
///
/// Handles are only valid for the session they were created in; a reconnect
/// invalidates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: String,
    pub destination: String,
}

/// Lifecycle hooks registered on a transport.
#[derive(Clone, Default)]
pub struct TransportHooks {
    pub on_connect: Option<ConnectHook>,
    pub on_disconnect: Option<DisconnectHook>,
}

impl fmt::Debug for TransportHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHooks")
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .finish()
    }
}

/// Connection policy a transport was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Delay before the transport retries a dropped session.
    pub reconnect_delay: Duration,
    /// Expected interval between heartbeats from the broker.
    pub heartbeat_incoming: Duration,
    /// Interval between heartbeats sent to the broker.
    pub heartbeat_outgoing: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::from(&BrokerConfig::default())
    }
}

impl From<&BrokerConfig> for TransportOptions {
    fn from(config: &BrokerConfig) -> Self {
        Self {
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            heartbeat_incoming: Duration::from_millis(config.heartbeat_incoming_ms),
            heartbeat_outgoing: Duration::from_millis(config.heartbeat_outgoing_ms),
        }
    }
}

/// Persistent publish/subscribe client driven by the session adapter.
///
/// Implementations deliver frames and lifecycle events asynchronously, from
/// any thread, and must not hold internal locks while invoking callbacks.
pub trait Transport: Send + Sync {
    /// Request a session. Success is reported through `on_connect`.
    fn activate(&self);

    /// Close the session and stop reconnecting.
    fn deactivate(&self);

    /// Whether the transport is activated (connected or trying to connect).
    fn is_active(&self) -> bool;

    /// Subscribe to a destination for the lifetime of the current session.
    fn subscribe(&self, destination: &str, handler: MessageHandler) -> Subscription;

    /// Send a frame. Fire-and-forget.
    fn publish(&self, destination: &str, body: &str);

    /// Replace the lifecycle hooks.
    fn set_hooks(&self, hooks: TransportHooks);

    /// Reconnect and heartbeat policy in effect.
    fn options(&self) -> TransportOptions;
}
