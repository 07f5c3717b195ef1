// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Build events
//!
//! Each server-sent message carries an envelope
//! `{"event": "<kind>", "version": "...", "data": {...}}`. Kinds other than
//! the ones modelled here are passed through as [`Event::Other`] and ignored.

mod consumer;

pub use consumer::EventConsumer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RunwayResult;

/// Status of a build as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Started,
    Succeeded,
    Failed,
    Errored,
    Aborted,
}

impl BuildStatus {
    /// Whether the build can no longer change
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Errored | Self::Aborted
        )
    }

    /// Process exit code for a terminal status
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::Failed => 1,
            Self::Errored => 2,
            Self::Aborted => 3,
            // never terminal; treated like an errored session
            Self::Pending | Self::Started => 2,
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Started => write!(f, "started"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Errored => write!(f, "errored"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Where a log line came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default)]
    pub name: String,

    /// `stdout` or `stderr`
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub payload: String,

    #[serde(default)]
    pub origin: Option<Origin>,
}

impl LogEvent {
    /// Whether the payload belongs on the error stream
    pub fn is_stderr(&self) -> bool {
        self.origin.as_ref().is_some_and(|o| o.source == "stderr")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: BuildStatus,

    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
}

/// A decoded build event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Log(LogEvent),
    Status(StatusEvent),
    Error(ErrorEvent),
    /// A kind this client does not interpret
    Other(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl Event {
    /// Decode one message payload
    pub fn from_envelope(payload: &str) -> RunwayResult<Self> {
        let envelope: Envelope = serde_json::from_str(payload)?;

        Ok(match envelope.event.as_str() {
            "log" => Self::Log(serde_json::from_value(envelope.data)?),
            "status" => Self::Status(serde_json::from_value(envelope.data)?),
            "error" => Self::Error(serde_json::from_value(envelope.data)?),
            _ => Self::Other(envelope.event),
        })
    }
}

/// One item read from a build's event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    Event(Event),
    /// The server's end-of-stream marker
    End,
}

/// A live stream of build events
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next message. A connection that closes before the end
    /// marker is an error, never `End`.
    async fn next_message(&mut self) -> RunwayResult<StreamMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_log() {
        let event = Event::from_envelope(
            r#"{"event":"log","version":"5.0","data":{"payload":"sup","origin":{"name":"one-off","source":"stderr"}}}"#,
        )
        .unwrap();

        match event {
            Event::Log(log) => {
                assert_eq!(log.payload, "sup");
                assert!(log.is_stderr());
            }
            other => panic!("Expected log event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_status() {
        let event =
            Event::from_envelope(r#"{"event":"status","data":{"status":"errored","time":1}}"#)
                .unwrap();
        assert_eq!(
            event,
            Event::Status(StatusEvent {
                status: BuildStatus::Errored,
                time: Some(1)
            })
        );
    }

    #[test]
    fn test_unknown_kinds_are_passed_through() {
        let event = Event::from_envelope(r#"{"event":"initialize","data":{"whatever":[1,2]}}"#)
            .unwrap();
        assert_eq!(event, Event::Other("initialize".into()));
    }

    #[test]
    fn test_malformed_envelope() {
        assert!(Event::from_envelope("not json").is_err());
        assert!(Event::from_envelope(r#"{"event":"status","data":{"status":"exploded"}}"#).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BuildStatus::Succeeded.exit_code(), 0);
        assert_eq!(BuildStatus::Failed.exit_code(), 1);
        assert_eq!(BuildStatus::Errored.exit_code(), 2);
        assert!(!BuildStatus::Started.is_terminal());
        assert!(BuildStatus::Aborted.is_terminal());
    }
}
