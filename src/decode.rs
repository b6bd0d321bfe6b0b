//! Payload decoders for the inbound queues.
//!
//! The conversion service is not consistent about encodings: progress may
//! arrive as a bare number, a numeric string, or a JSON object carrying a
//! `progress` field. Text queues pass through, with an empty payload meaning
//! "no value".

use convertlink_common::Queue;
use serde_json::Value;

use crate::store::FieldUpdate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("progress payload is not numeric: {0:?}")]
    NotNumeric(String),

    #[error("progress value is not finite: {0}")]
    NonFinite(f64),

    #[error("queue {0} does not carry inbound frames")]
    Outbound(Queue),
}

/// Decode a progress payload.
///
/// Structured JSON is tried first; if the payload is not valid JSON it is
/// parsed directly as a number. A JSON string holding a number gets the same
/// treatment as a bare numeric payload. `null`, at the top level or in the
/// `progress` field, is not a value. Only finite values are accepted.
pub fn decode_progress(payload: &str) -> Result<f64, DecodeError> {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(json) => progress_from_json(&json),
        Err(_) => payload.trim().parse::<f64>().ok(),
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(DecodeError::NonFinite(v)),
        None => Err(DecodeError::NotNumeric(payload.to_string())),
    }
}

fn progress_from_json(json: &Value) -> Option<f64> {
    match json {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("progress").and_then(|field| match field {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
        _ => None,
    }
}

/// Decode a text payload; empty means absent.
pub fn decode_text(payload: &str) -> Option<String> {
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// Decode an error payload. Passed through verbatim.
pub fn decode_error(payload: &str) -> String {
    payload.to_string()
}

/// Decode a frame received on `queue` into the store update it implies.
pub fn decode_frame(queue: Queue, payload: &str) -> Result<FieldUpdate, DecodeError> {
    match queue {
        Queue::VideoId => Ok(FieldUpdate::VideoId(decode_text(payload))),
        Queue::Title => Ok(FieldUpdate::Title(decode_text(payload))),
        Queue::Progress => decode_progress(payload).map(FieldUpdate::Progress),
        Queue::Error => Ok(FieldUpdate::Error(decode_error(payload))),
        Queue::Result => Ok(FieldUpdate::DownloadUrl(decode_text(payload))),
        Queue::JobStart => Err(DecodeError::Outbound(queue)),
    }
}
