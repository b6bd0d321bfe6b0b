//! Simulated conversion service for the `simulate` command.
//!
//! Answers every job-start frame on a [`MemoryTransport`] the way the real
//! service does: identity first, then progress in mixed encodings, then a
//! download URL or an error.

use std::sync::{Arc, Weak};
use std::time::Duration;

use convertlink::config::DestinationConfig;
use convertlink::transport::{Message, MessageHandler};
use convertlink::{MemoryTransport, OutputFormat, Queue};

const PROGRESS_STEPS: [u32; 5] = [0, 25, 50, 75, 100];

#[derive(Debug, Clone)]
pub struct ServiceScript {
    pub format: OutputFormat,
    pub failure: Option<String>,
    pub step_delay: Duration,
}

/// Register the simulated service on `transport`.
pub fn install(
    transport: &Arc<MemoryTransport>,
    destinations: &DestinationConfig,
    script: ServiceScript,
    runtime: tokio::runtime::Handle,
) {
    let weak: Weak<MemoryTransport> = Arc::downgrade(transport);
    let job_destinations = destinations.clone();

    let responder: MessageHandler = Arc::new(move |message: &Message| {
        let weak = weak.clone();
        let destinations = job_destinations.clone();
        let script = script.clone();
        let source_url = source_url(&message.body);
        runtime.spawn(async move {
            run_job(weak, destinations, script, source_url).await;
        });
    });

    transport.on_publish(destinations.get(Queue::JobStart), responder);
}

async fn run_job(
    transport: Weak<MemoryTransport>,
    destinations: DestinationConfig,
    script: ServiceScript,
    source_url: String,
) {
    let send = |queue: Queue, body: &str| match transport.upgrade() {
        Some(transport) => {
            transport.deliver(destinations.get(queue), body);
            true
        }
        None => false,
    };

    let video_id = video_id_from_url(&source_url);
    tracing::debug!(video_id = %video_id, "Simulated service accepted job");

    if !send(Queue::VideoId, &video_id) {
        return;
    }
    send(Queue::Title, &format!("Simulated video {}", video_id));

    for (i, step) in PROGRESS_STEPS.iter().enumerate() {
        tokio::time::sleep(script.step_delay).await;

        if let Some(message) = &script.failure {
            if *step >= 50 {
                send(Queue::Error, message);
                return;
            }
        }

        // Rotate through the encodings the real service is known to emit.
        let body = match i % 3 {
            0 => step.to_string(),
            1 => format!(r#"{{"progress": {}}}"#, step),
            _ => format!(r#""{}""#, step),
        };
        send(Queue::Progress, &body);
    }

    // A malformed frame the client has to ignore.
    send(Queue::Progress, "n/a");

    send(
        Queue::Result,
        &format!("/download/{}.{}", video_id, script.format.extension()),
    );
}

/// Raw URL, or the `url` field of a JSON job request.
fn source_url(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("url").and_then(|u| u.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// `v=` query parameter, else the last path segment, else `"video"`.
fn video_id_from_url(url: &str) -> String {
    if let Some((_, query)) = url.split_once('?') {
        if let Some(id) = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .filter(|id| !id.is_empty())
        {
            return id.to_string();
        }
    }

    url.split(&['?', '#'][..])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("video")
        .to_string()
}
