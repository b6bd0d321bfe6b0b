//! Core type definitions for conversion requests and service queues.
//!
//! Enums are serialized in lowercase so they can be written directly into
//! configuration files and outbound JSON payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Audio only, MPEG-1 Layer III.
    #[default]
    Mp3,
    /// Audio and video in an MP4 container.
    Mp4,
}

impl OutputFormat {
    /// File extension for this format, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

/// Logical queue used to exchange messages with the conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    /// Outbound: asks the service to start a job.
    JobStart,
    /// Inbound: identifier of the source video.
    VideoId,
    /// Inbound: display title of the source video.
    Title,
    /// Inbound: numeric job progress.
    Progress,
    /// Inbound: human-readable error text.
    Error,
    /// Inbound: download URL or token of the finished job.
    Result,
}

impl Queue {
    /// Every queue the adapter subscribes to, in registration order.
    pub const INBOUND: [Queue; 5] = [
        Queue::VideoId,
        Queue::Title,
        Queue::Progress,
        Queue::Error,
        Queue::Result,
    ];

    /// Whether messages on this queue flow from the service to the client.
    pub fn is_inbound(&self) -> bool {
        !matches!(self, Self::JobStart)
    }

    /// Destination path used by the reference conversion service.
    pub fn default_destination(&self) -> &'static str {
        match self {
            Self::JobStart => "/app/download",
            Self::VideoId => "/queue/videoId",
            Self::Title => "/queue/title",
            Self::Progress => "/queue/progress",
            Self::Error => "/queue/error",
            Self::Result => "/queue/mp3",
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobStart => write!(f, "job_start"),
            Self::VideoId => write!(f, "video_id"),
            Self::Title => write!(f, "title"),
            Self::Progress => write!(f, "progress"),
            Self::Error => write!(f, "error"),
            Self::Result => write!(f, "result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("mp3".parse::<OutputFormat>().unwrap(), OutputFormat::Mp3);
        assert_eq!("MP3".parse::<OutputFormat>().unwrap(), OutputFormat::Mp3);
        assert_eq!(" Mp4 ".parse::<OutputFormat>().unwrap(), OutputFormat::Mp4);
        assert!("flac".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_serialization() {
        let json = serde_json::to_string(&OutputFormat::Mp4).unwrap();
        assert_eq!(json, r#""mp4""#);

        let format: OutputFormat = serde_json::from_str(r#""mp3""#).unwrap();
        assert_eq!(format, OutputFormat::Mp3);
        assert_eq!(OutputFormat::default(), OutputFormat::Mp3);
    }

    #[test]
    fn test_queue_direction() {
        assert!(!Queue::JobStart.is_inbound());
        for queue in Queue::INBOUND {
            assert!(queue.is_inbound(), "{} should be inbound", queue);
        }
    }

    #[test]
    fn test_default_destinations_are_distinct() {
        let mut all: Vec<&str> = Queue::INBOUND
            .iter()
            .map(|q| q.default_destination())
            .collect();
        all.push(Queue::JobStart.default_destination());
        let len = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), len);
    }

    #[test]
    fn test_queue_display() {
        assert_eq!(Queue::VideoId.to_string(), "video_id");
        assert_eq!(Queue::Result.to_string(), "result");
    }
}
