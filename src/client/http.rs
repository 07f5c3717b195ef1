// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! HTTP build server client
//!
//! All routes live under `<target>/api/v1`. The client keeps a cookie store
//! so the session cookie set on build submission is replayed on the
//! requests that follow.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::collections::VecDeque;
use std::io;

use super::sse::{SseDecoder, SseMessage};
use super::{Build, BuildServer, Pipe};
use crate::archive::ByteStream;
use crate::errors::{RunwayError, RunwayResult};
use crate::events::{Event, EventSource, StreamMessage};
use crate::plan::Plan;
use crate::target::Target;

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Deserialize)]
struct PipeResponse {
    id: String,
}

/// HTTP implementation of [`BuildServer`]
pub struct HttpClient {
    client: reqwest::Client,
    api: String,
}

impl HttpClient {
    /// Create a client for `target`, sending its token on every request
    pub fn new(target: &Target) -> RunwayResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(authorization) = target.authorization() {
            let value = HeaderValue::from_str(&authorization).map_err(|e| RunwayError::Http {
                message: format!("invalid stored token: {}", e),
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .danger_accept_invalid_certs(target.insecure)
            .build()?;

        Ok(Self {
            client,
            api: format!("{}{}", target.url, API_PREFIX),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api, path)
    }

    /// URL of a pipe; both ends share it
    pub fn pipe_url(&self, id: &str) -> String {
        self.url(&format!("/pipes/{}", id))
    }

    async fn describe_failure(response: Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) if !body.trim().is_empty() => format!("{}: {}", status, body.trim()),
            _ => status.to_string(),
        }
    }
}

#[async_trait]
impl BuildServer for HttpClient {
    async fn create_pipe(&self) -> RunwayResult<Pipe> {
        let response = self
            .client
            .post(self.url("/pipes"))
            .send()
            .await
            .map_err(|e| RunwayError::PipeCreationFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunwayError::PipeCreationFailed {
                reason: Self::describe_failure(response).await,
            });
        }

        let created: PipeResponse =
            response
                .json()
                .await
                .map_err(|e| RunwayError::PipeCreationFailed {
                    reason: e.to_string(),
                })?;

        let url = self.pipe_url(&created.id);
        tracing::debug!(pipe = %created.id, "created pipe");

        Ok(Pipe {
            id: created.id,
            write_url: url.clone(),
            read_url: url,
        })
    }

    async fn submit_build(&self, plan: &Plan) -> RunwayResult<Build> {
        let response = self
            .client
            .post(self.url("/builds"))
            .json(plan)
            .send()
            .await
            .map_err(|e| RunwayError::BuildSubmissionFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let message = response.text().await.unwrap_or_default();
            return Err(RunwayError::BuildConfigInvalid { message });
        }
        if !status.is_success() {
            return Err(RunwayError::BuildSubmissionFailed {
                reason: Self::describe_failure(response).await,
            });
        }

        let build: Build =
            response
                .json()
                .await
                .map_err(|e| RunwayError::BuildSubmissionFailed {
                    reason: e.to_string(),
                })?;

        tracing::debug!(build_id = build.id, "submitted build");
        Ok(build)
    }

    async fn build_events(&self, build_id: u64) -> RunwayResult<Box<dyn EventSource>> {
        let response = self
            .client
            .get(self.url(&format!("/builds/{}/events", build_id)))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| RunwayError::EventStreamFailed {
                build_id,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunwayError::EventStreamFailed {
                build_id,
                reason: Self::describe_failure(response).await,
            });
        }

        Ok(Box::new(SseEventSource::new(build_id, response)))
    }

    async fn abort_build(&self, build_id: u64) -> RunwayResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/builds/{}/abort", build_id)))
            .send()
            .await
            .map_err(|e| RunwayError::AbortFailed {
                build_id,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunwayError::AbortFailed {
                build_id,
                reason: Self::describe_failure(response).await,
            });
        }

        Ok(())
    }

    async fn write_pipe(&self, pipe: Pipe, body: ByteStream) -> RunwayResult<()> {
        let response = self
            .client
            .put(&pipe.write_url)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| RunwayError::UploadFailed {
                pipe: pipe.id.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunwayError::UploadFailed {
                pipe: pipe.id,
                reason: Self::describe_failure(response).await,
            });
        }

        tracing::debug!(pipe = %pipe.id, "pipe written");
        Ok(())
    }

    async fn read_pipe(&self, pipe: Pipe) -> RunwayResult<ByteStream> {
        let response = self
            .client
            .get(&pipe.read_url)
            .send()
            .await
            .map_err(|e| RunwayError::PipeReadFailed {
                pipe: pipe.id.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunwayError::PipeReadFailed {
                pipe: pipe.id,
                reason: Self::describe_failure(response).await,
            });
        }

        Ok(response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(io::Error::other)
            .boxed())
    }
}

/// Event source reading a `text/event-stream` response
pub struct SseEventSource {
    build_id: u64,
    response: Response,
    decoder: SseDecoder,
    pending: VecDeque<SseMessage>,
}

impl SseEventSource {
    pub fn new(build_id: u64, response: Response) -> Self {
        Self {
            build_id,
            response,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    fn interrupted(&self, reason: String) -> RunwayError {
        RunwayError::EventStreamInterrupted {
            build_id: self.build_id,
            reason,
        }
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn next_message(&mut self) -> RunwayResult<StreamMessage> {
        loop {
            while let Some(message) = self.pending.pop_front() {
                match message.name.as_deref() {
                    Some("end") => return Ok(StreamMessage::End),
                    Some("event") | None if !message.data.is_empty() => {
                        match Event::from_envelope(&message.data) {
                            Ok(event) => return Ok(StreamMessage::Event(event)),
                            Err(e) => tracing::warn!(
                                build_id = self.build_id,
                                error = %e,
                                payload = %message.data,
                                "skipping undecodable event"
                            ),
                        }
                    }
                    other => {
                        tracing::debug!(name = ?other, "skipping server-sent message");
                    }
                }
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => self.pending.extend(self.decoder.feed(&bytes)),
                Ok(None) => {
                    return Err(self.interrupted("connection closed without end marker".into()))
                }
                Err(e) => return Err(self.interrupted(e.to_string())),
            }
        }
    }
}
