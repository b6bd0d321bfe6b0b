//! Session adapter.
//!
//! Mediates between a [`Transport`] and the [`SessionStore`]:
//!
//! ```text
//! connect() ──> Transport::activate ──> on_connect ──> subscribe x5
//!                                                          │
//! start_conversion() ──> store.reset() ──> publish   frames│
//!                                                          ▼
//!                                  decode_frame ──> store.apply ──> observers
//! ```
//!
//! None of the public operations fail towards the caller. Problems are
//! logged, and everything else is observed through the store.

use std::sync::{Arc, Weak};

use convertlink_common::{Error, OutputFormat, Queue, Result};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::{Config, DestinationConfig};
use crate::decode::decode_frame;
use crate::store::{ConnectionState, SessionSnapshot, SessionStore};
use crate::transport::{
    ConnectFrame, Message, MessageHandler, Subscription, Transport, TransportHooks,
};

/// Adapter settings taken from [`Config`].
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub destinations: DestinationConfig,
    pub include_format: bool,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            destinations: config.destinations.clone(),
            include_format: config.session.include_format,
        }
    }
}

/// Job-start payload used when the format is transmitted.
#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    url: &'a str,
    format: OutputFormat,
}

pub struct SessionAdapter {
    shared: Arc<Shared>,
}

struct Shared {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    settings: SessionSettings,
    subscriptions: Mutex<Vec<Subscription>>,
    /// Serialises on-connect handling with `disconnect`. Never taken by the
    /// on-disconnect hook, which `deactivate` may invoke synchronously.
    lifecycle: Mutex<()>,
}

impl SessionAdapter {
    /// Create an adapter and register its lifecycle hooks on `transport`.
    ///
    /// The transport is not activated until [`connect`](Self::connect).
    pub fn new(transport: Arc<dyn Transport>, settings: SessionSettings) -> Self {
        let shared = Arc::new(Shared {
            transport,
            store: Arc::new(SessionStore::new()),
            settings,
            subscriptions: Mutex::new(Vec::new()),
            lifecycle: Mutex::new(()),
        });

        let on_connect: Weak<Shared> = Arc::downgrade(&shared);
        let on_disconnect: Weak<Shared> = Arc::downgrade(&shared);
        shared.transport.set_hooks(TransportHooks {
            on_connect: Some(Arc::new(move |frame: &ConnectFrame| {
                if let Some(shared) = on_connect.upgrade() {
                    shared.handle_connect(frame);
                }
            })),
            on_disconnect: Some(Arc::new(move || {
                if let Some(shared) = on_disconnect.upgrade() {
                    shared.handle_disconnect();
                }
            })),
        });

        Self { shared }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(transport, SessionSettings::from(config))
    }

    /// Request a session unless one is established or already being set up.
    pub fn connect(&self) {
        let shared = &self.shared;
        if shared.store.connected().get() || shared.transport.is_active() {
            tracing::debug!("Connect requested while already connected or connecting");
            return;
        }

        let options = shared.transport.options();
        tracing::info!(
            reconnect_delay_ms = options.reconnect_delay.as_millis() as u64,
            heartbeat_incoming_ms = options.heartbeat_incoming.as_millis() as u64,
            heartbeat_outgoing_ms = options.heartbeat_outgoing.as_millis() as u64,
            "Attempting to connect to conversion service"
        );
        shared.store.set_connection(ConnectionState::Connecting);
        shared.transport.activate();
    }

    /// Start a conversion, logging instead of failing when it cannot be sent.
    pub fn start_conversion(&self, source_url: &str, format: OutputFormat) {
        if let Err(e) = self.try_start_conversion(source_url, format) {
            tracing::error!("Cannot start conversion of {}: {}", source_url, e);
        }
    }

    /// Start a conversion.
    ///
    /// Clears every job-scoped field, then publishes the job-start message.
    /// Nothing is cleared or sent when there is no session.
    pub fn try_start_conversion(&self, source_url: &str, format: OutputFormat) -> Result<()> {
        let shared = &self.shared;
        if !shared.store.connected().get() {
            return Err(Error::NotConnected);
        }

        let body = if shared.settings.include_format {
            serde_json::to_string(&JobRequest {
                url: source_url,
                format,
            })?
        } else {
            source_url.to_string()
        };

        let generation = shared.store.reset();
        let destination = shared.settings.destinations.get(Queue::JobStart);
        tracing::info!(
            generation,
            %format,
            destination,
            "Starting conversion of {}",
            source_url
        );
        shared.transport.publish(destination, &body);

        Ok(())
    }

    /// Close the session. `connected` is false as soon as this returns.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        let _lifecycle = shared.lifecycle.lock();
        if !shared.transport.is_active() {
            return;
        }

        shared.transport.deactivate();
        shared.subscriptions.lock().clear();
        shared.store.set_connection(ConnectionState::Disconnected);
        tracing::info!("Disconnected from conversion service");
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.shared.store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.store.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.store.connected().get()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.store.connection().get()
    }

    /// Subscriptions registered for the current session.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.shared.subscriptions.lock().clone()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.shared.settings
    }
}

impl Shared {
    fn handle_connect(&self, frame: &ConnectFrame) {
        let _lifecycle = self.lifecycle.lock();
        if !self.store.connect_if(|| self.transport.is_active()) {
            tracing::warn!("Ignoring connect event from an inactive transport");
            return;
        }

        tracing::info!(
            version = frame.header("version").unwrap_or("unknown"),
            "Connection to conversion service established"
        );

        // Subscriptions from an earlier session died with it.
        let subscriptions: Vec<Subscription> =
            Queue::INBOUND.iter().map(|q| self.register(*q)).collect();
        *self.subscriptions.lock() = subscriptions;
    }

    fn handle_disconnect(&self) {
        self.subscriptions.lock().clear();
        self.store.set_connection(ConnectionState::Disconnected);
        tracing::info!("Connection to conversion service lost");
    }

    fn register(&self, queue: Queue) -> Subscription {
        let store = Arc::clone(&self.store);
        let handler: MessageHandler = Arc::new(move |message: &Message| {
            match decode_frame(queue, &message.body) {
                Ok(update) => {
                    tracing::trace!(%queue, ?update, "Applying frame");
                    store.apply(update);
                }
                Err(e) => tracing::debug!(%queue, "Dropping frame: {}", e),
            }
        });

        let subscription = self
            .transport
            .subscribe(self.settings.destinations.get(queue), handler);
        tracing::info!(
            %queue,
            id = %subscription.id,
            destination = %subscription.destination,
            "Subscribed to queue"
        );
        subscription
    }
}
