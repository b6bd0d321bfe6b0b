//! In-process transport.
//!
//! `MemoryTransport` keeps subscriptions and published frames in memory and
//! lets the caller play the broker's part: acknowledge a session, drop it,
//! deliver frames, and answer published messages through responders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

use super::{
    ConnectFrame, Message, MessageHandler, Subscription, Transport, TransportHooks,
    TransportOptions,
};

pub struct MemoryTransport {
    options: TransportOptions,
    auto_connect: bool,
    active: AtomicBool,
    connected: AtomicBool,
    activations: AtomicUsize,
    next_subscription: AtomicU64,
    hooks: RwLock<TransportHooks>,
    subscriptions: RwLock<Vec<(Subscription, MessageHandler)>>,
    published: Mutex<Vec<Message>>,
    responders: RwLock<HashMap<String, MessageHandler>>,
}

impl MemoryTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            auto_connect: false,
            active: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
            next_subscription: AtomicU64::new(0),
            hooks: RwLock::new(TransportHooks::default()),
            subscriptions: RwLock::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            responders: RwLock::new(HashMap::new()),
        }
    }

    /// Acknowledge the session as soon as `activate` is called.
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// Play the broker acknowledging a session: fires `on_connect`.
    ///
    /// Does not check `is_active`, so a connect event racing a deactivation
    /// can be reproduced.
    pub fn establish(&self) {
        self.establish_with(ConnectFrame {
            headers: vec![("version".to_string(), "1.2".to_string())],
        });
    }

    pub fn establish_with(&self, frame: ConnectFrame) {
        self.connected.store(true, Ordering::SeqCst);
        let hook = self.hooks.read().on_connect.clone();
        if let Some(hook) = hook {
            hook(&frame);
        }
    }

    /// Play a dropped connection. The transport stays active, as a client with
    /// a reconnect policy would, and every subscription is invalidated.
    pub fn drop_connection(&self) {
        self.close_session();
    }

    /// Deliver a frame to every subscription on `destination`.
    ///
    /// Returns the number of handlers invoked. Nothing is delivered while no
    /// session is established.
    pub fn deliver(&self, destination: &str, body: &str) -> usize {
        if !self.is_connected() {
            tracing::debug!(destination, "Dropping frame delivered without a session");
            return 0;
        }

        let handlers: Vec<MessageHandler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|(sub, _)| sub.destination == destination)
            .map(|(_, handler)| handler.clone())
            .collect();

        let message = Message::new(destination, body);
        for handler in &handlers {
            handler(&message);
        }
        handlers.len()
    }

    /// Answer every frame published to `destination` with `responder`.
    pub fn on_publish(&self, destination: &str, responder: MessageHandler) {
        self.responders
            .write()
            .insert(destination.to_string(), responder);
    }

    /// Frames published so far, oldest first.
    pub fn published(&self) -> Vec<Message> {
        self.published.lock().clone()
    }

    /// Live subscriptions on `destination`.
    pub fn subscriptions_for(&self, destination: &str) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .iter()
            .filter(|(sub, _)| sub.destination == destination)
            .map(|(sub, _)| sub.clone())
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Number of times `activate` turned an inactive transport active.
    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn close_session(&self) {
        let was_connected = self.connected.swap(false, Ordering::SeqCst);
        self.subscriptions.write().clear();
        if !was_connected {
            return;
        }
        let hook = self.hooks.read().on_disconnect.clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(TransportOptions::default())
    }
}

impl Transport for MemoryTransport {
    fn activate(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        self.activations.fetch_add(1, Ordering::SeqCst);
        if self.auto_connect {
            self.establish();
        }
    }

    fn deactivate(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.close_session();
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn subscribe(&self, destination: &str, handler: MessageHandler) -> Subscription {
        let n = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let subscription = Subscription {
            id: format!("sub-{}", n),
            destination: destination.to_string(),
        };
        self.subscriptions
            .write()
            .push((subscription.clone(), handler));
        subscription
    }

    fn publish(&self, destination: &str, body: &str) {
        let message = Message::new(destination, body);
        self.published.lock().push(message.clone());

        let responder = self.responders.read().get(destination).cloned();
        if let Some(responder) = responder {
            responder(&message);
        }
    }

    fn set_hooks(&self, hooks: TransportHooks) {
        *self.hooks.write() = hooks;
    }

    fn options(&self) -> TransportOptions {
        self.options
    }
}
