use convertlink_common::{OutputFormat, Queue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub destinations: DestinationConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// WebSocket endpoint of the message broker
    #[serde(default = "default_broker_url")]
    pub url: String,

    /// Delay before a dropped session is retried (0 disables reconnects)
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Expected broker heartbeat interval (0 disables)
    #[serde(default = "default_heartbeat")]
    pub heartbeat_incoming_ms: u64,

    /// Client heartbeat interval (0 disables)
    #[serde(default = "default_heartbeat")]
    pub heartbeat_outgoing_ms: u64,
}

fn default_broker_url() -> String {
    "ws://localhost:8080/ws".to_string()
}
fn default_reconnect_delay() -> u64 {
    5000
}
fn default_heartbeat() -> u64 {
    4000
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            reconnect_delay_ms: default_reconnect_delay(),
            heartbeat_incoming_ms: default_heartbeat(),
            heartbeat_outgoing_ms: default_heartbeat(),
        }
    }
}

/// Destination paths of the service queues.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DestinationConfig {
    #[serde(default = "default_job_start")]
    pub job_start: String,

    #[serde(default = "default_video_id")]
    pub video_id: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_progress")]
    pub progress: String,

    #[serde(default = "default_error")]
    pub error: String,

    #[serde(default = "default_result")]
    pub result: String,
}

fn default_job_start() -> String {
    Queue::JobStart.default_destination().to_string()
}
fn default_video_id() -> String {
    Queue::VideoId.default_destination().to_string()
}
fn default_title() -> String {
    Queue::Title.default_destination().to_string()
}
fn default_progress() -> String {
    Queue::Progress.default_destination().to_string()
}
fn default_error() -> String {
    Queue::Error.default_destination().to_string()
}
fn default_result() -> String {
    Queue::Result.default_destination().to_string()
}

impl DestinationConfig {
    /// Destination path configured for `queue`.
    pub fn get(&self, queue: Queue) -> &str {
        match queue {
            Queue::JobStart => &self.job_start,
            Queue::VideoId => &self.video_id,
            Queue::Title => &self.title,
            Queue::Progress => &self.progress,
            Queue::Error => &self.error,
            Queue::Result => &self.result,
        }
    }

    /// All destinations paired with their queue, outbound first.
    pub fn iter(&self) -> impl Iterator<Item = (Queue, &str)> {
        std::iter::once(Queue::JobStart)
            .chain(Queue::INBOUND)
            .map(move |queue| (queue, self.get(queue)))
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            job_start: default_job_start(),
            video_id: default_video_id(),
            title: default_title(),
            progress: default_progress(),
            error: default_error(),
            result: default_result(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Send `{"url", "format"}` JSON on job start instead of the bare URL
    #[serde(default)]
    pub include_format: bool,

    /// Format used when the caller does not pick one
    #[serde(default)]
    pub default_format: OutputFormat,
}
