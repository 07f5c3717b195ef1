// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Build server client
//!
//! The [`BuildServer`] trait is everything the orchestrator needs from the
//! remote side: pipes for moving archives, build submission, the event
//! stream and abort. [`HttpClient`] speaks the JSON-over-HTTP API.

mod http;
mod sse;

pub use http::{HttpClient, SseEventSource};
pub use sse::{SseDecoder, SseMessage};

use async_trait::async_trait;
use serde::Deserialize;

use crate::archive::ByteStream;
use crate::errors::RunwayResult;
use crate::events::EventSource;
use crate::plan::Plan;

/// A server-issued single-use transfer channel.
///
/// Writing and reading address the same URL with different methods; the
/// fields are kept apart so each side of the plan names the end it uses.
/// Handles are consumed by the one write or read they allow.
#[derive(Debug, PartialEq, Eq)]
pub struct Pipe {
    pub id: String,
    /// Where bytes are `PUT`
    pub write_url: String,
    /// Where bytes are `GET`
    pub read_url: String,
}

/// A submitted build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Build {
    pub id: u64,
}

/// Remote operations used by a one-off execution
#[async_trait]
pub trait BuildServer: Send + Sync + 'static {
    /// Create a pipe
    async fn create_pipe(&self) -> RunwayResult<Pipe>;

    /// Submit a plan, creating a build
    async fn submit_build(&self, plan: &Plan) -> RunwayResult<Build>;

    /// Open the live event stream of a build
    async fn build_events(&self, build_id: u64) -> RunwayResult<Box<dyn EventSource>>;

    /// Ask the server to abort a build
    async fn abort_build(&self, build_id: u64) -> RunwayResult<()>;

    /// Stream `body` into the pipe's write end
    async fn write_pipe(&self, pipe: Pipe, body: ByteStream) -> RunwayResult<()>;

    /// Stream the pipe's contents from its read end
    async fn read_pipe(&self, pipe: Pipe) -> RunwayResult<ByteStream>;
}
