//! Integration tests for connect and disconnect events arriving on different
//! threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use convertlink::transport::{
    ConnectFrame, MessageHandler, Subscription, Transport, TransportHooks, TransportOptions,
};
use convertlink::{SessionAdapter, SessionSettings};
use parking_lot::Mutex;

type Gate = (mpsc::Sender<()>, mpsc::Receiver<()>);

/// Transport whose next `is_active` call can be held open after reading the
/// flag, to interleave another thread at that point.
#[derive(Default)]
struct GatedTransport {
    active: AtomicBool,
    next_subscription: AtomicU64,
    hooks: Mutex<TransportHooks>,
    subscriptions: Mutex<Vec<Subscription>>,
    gate: Mutex<Option<Gate>>,
}

impl GatedTransport {
    /// Hold the next `is_active` call: signal `reached`, then wait on `resume`.
    fn hold_next_check(&self, reached: mpsc::Sender<()>, resume: mpsc::Receiver<()>) {
        *self.gate.lock() = Some((reached, resume));
    }

    fn fire_connect(&self) {
        let hook = self.hooks.lock().on_connect.clone();
        if let Some(hook) = hook {
            hook(&ConnectFrame::default());
        }
    }

    fn live_subscriptions(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl Transport for GatedTransport {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.subscriptions.lock().clear();
    }

    fn is_active(&self) -> bool {
        let active = self.active.load(Ordering::SeqCst);
        let gate = self.gate.lock().take();
        if let Some((reached, resume)) = gate {
            reached.send(()).unwrap();
            resume.recv().unwrap();
        }
        active
    }

    fn subscribe(&self, destination: &str, _handler: MessageHandler) -> Subscription {
        let n = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let subscription = Subscription {
            id: format!("gated-{}", n),
            destination: destination.to_string(),
        };
        self.subscriptions.lock().push(subscription.clone());
        subscription
    }

    fn publish(&self, _destination: &str, _body: &str) {}

    fn set_hooks(&self, hooks: TransportHooks) {
        *self.hooks.lock() = hooks;
    }

    fn options(&self) -> TransportOptions {
        TransportOptions::default()
    }
}

#[test]
fn disconnect_during_connect_event_leaves_session_closed() {
    let transport = Arc::new(GatedTransport::default());
    let adapter = Arc::new(SessionAdapter::new(
        transport.clone(),
        SessionSettings::default(),
    ));
    adapter.connect();

    let (reached_tx, reached_rx) = mpsc::channel();
    let (resume_tx, resume_rx) = mpsc::channel();
    transport.hold_next_check(reached_tx, resume_rx);

    // The connect event has seen an active transport and is held there.
    let connecting = {
        let transport = transport.clone();
        thread::spawn(move || transport.fire_connect())
    };
    reached_rx.recv().unwrap();

    let disconnecting = {
        let adapter = adapter.clone();
        thread::spawn(move || adapter.disconnect())
    };
    thread::sleep(Duration::from_millis(50));
    resume_tx.send(()).unwrap();

    connecting.join().unwrap();
    disconnecting.join().unwrap();

    assert!(!transport.is_active());
    assert!(!adapter.is_connected());
    assert!(adapter.subscriptions().is_empty());
    assert_eq!(transport.live_subscriptions(), 0);
}

#[test]
fn connect_event_after_disconnect_is_ignored() {
    let transport = Arc::new(GatedTransport::default());
    let adapter = SessionAdapter::new(transport.clone(), SessionSettings::default());

    adapter.connect();
    adapter.disconnect();
    transport.fire_connect();

    assert!(!adapter.is_connected());
    assert_eq!(transport.live_subscriptions(), 0);
}
