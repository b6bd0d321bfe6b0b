//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a [`SessionAdapter`] to a
//! [`MemoryTransport`] so tests can play the broker's side of a session.

#![allow(dead_code)]

use std::sync::Arc;

use convertlink::config::Config;
use convertlink::{MemoryTransport, Queue, SessionAdapter};

pub const SOURCE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub struct TestHarness {
    pub transport: Arc<MemoryTransport>,
    pub adapter: SessionAdapter,
    pub config: Config,
}

impl TestHarness {
    /// Adapter with default configuration, not yet connected.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let transport = Arc::new(MemoryTransport::default());
        let adapter = SessionAdapter::from_config(transport.clone(), &config);
        Self {
            transport,
            adapter,
            config,
        }
    }

    /// Adapter with an established session.
    pub fn connected() -> Self {
        let h = Self::new();
        h.adapter.connect();
        h.transport.establish();
        h
    }

    /// Deliver a frame on the destination configured for `queue`.
    pub fn frame(&self, queue: Queue, body: &str) -> usize {
        self.transport
            .deliver(self.config.destinations.get(queue), body)
    }

    pub fn destination(&self, queue: Queue) -> &str {
        self.config.destinations.get(queue)
    }

    /// Bodies published on the job-start destination.
    pub fn job_requests(&self) -> Vec<String> {
        let destination = self.destination(Queue::JobStart).to_string();
        self.transport
            .published()
            .into_iter()
            .filter(|m| m.destination == destination)
            .map(|m| m.body)
            .collect()
    }
}
