// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Event consumer
//!
//! Renders a build's events as they arrive and reports the status the build
//! finished with.

use std::io::{self, Stderr, Stdout, Write};

use super::{BuildStatus, Event, EventSource, StreamMessage};
use crate::errors::{RunwayError, RunwayResult};
use crate::utils::{error, status_label};

/// Event consumer writing build output to a pair of streams
pub struct EventConsumer<O, E> {
    out: O,
    err: E,
}

impl EventConsumer<Stdout, Stderr> {
    /// Consumer bound to the process's stdout and stderr
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O, E> EventConsumer<O, E>
where
    O: Write + Send,
    E: Write + Send,
{
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Tell the user which build is running
    pub fn announce(&mut self, build_id: u64) -> RunwayResult<()> {
        writeln!(self.out, "executing build {}", build_id)?;
        self.out.flush()?;
        Ok(())
    }

    /// Read `source` until the end marker and return the final status.
    ///
    /// An end marker with no terminal status before it counts as success. A
    /// stream that drops before any terminal status is an error; one that
    /// drops after it still yields that status.
    pub async fn consume(
        &mut self,
        build_id: u64,
        source: &mut dyn EventSource,
    ) -> RunwayResult<BuildStatus> {
        let mut terminal: Option<BuildStatus> = None;

        loop {
            let message = match source.next_message().await {
                Ok(message) => message,
                Err(e) => match terminal {
                    Some(status) => {
                        tracing::warn!(build_id, error = %e, "event stream dropped after build finished");
                        return Ok(status);
                    }
                    None => {
                        return Err(match e {
                            interrupted @ RunwayError::EventStreamInterrupted { .. } => interrupted,
                            other => RunwayError::EventStreamInterrupted {
                                build_id,
                                reason: other.to_string(),
                            },
                        })
                    }
                },
            };

            match message {
                StreamMessage::End => {
                    tracing::debug!(build_id, "end of event stream");
                    return Ok(terminal.unwrap_or(BuildStatus::Succeeded));
                }
                StreamMessage::Event(Event::Log(log)) => {
                    if log.is_stderr() {
                        self.err.write_all(log.payload.as_bytes())?;
                        self.err.flush()?;
                    } else {
                        self.out.write_all(log.payload.as_bytes())?;
                        self.out.flush()?;
                    }
                }
                StreamMessage::Event(Event::Status(status)) => {
                    tracing::debug!(build_id, status = %status.status, "build status");
                    if status.status.is_terminal() {
                        writeln!(self.err, "{}", status_label(status.status))?;
                        self.err.flush()?;
                        terminal = Some(status.status);
                    }
                }
                StreamMessage::Event(Event::Error(e)) => {
                    writeln!(self.err, "{}", error(&e.message))?;
                    self.err.flush()?;
                }
                StreamMessage::Event(Event::Other(kind)) => {
                    tracing::debug!(build_id, kind = %kind, "ignoring event");
                }
            }
        }
    }

    /// Give back the underlying streams
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
