// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! # runway - one-off task execution
//!
//! `runway` runs a single task on a remote build server without defining a
//! pipeline. Local directories are uploaded as the task's inputs, the build's
//! logs stream back to the terminal, and declared outputs can be downloaded
//! when the build succeeds.
//!
//! ## Features
//!
//! - **Local inputs** - The working directory, or any `-i name=path`, becomes an input
//! - **Live output** - Build logs stream to stdout and stderr as they happen
//! - **Output download** - `-o name=path` brings outputs back after a successful build
//! - **Interruptible** - Ctrl+C aborts the remote build and waits for its final status
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the task in the current directory
//! runway -t https://ci.example.com execute -c task.yml
//!
//! # Bind inputs and fetch an output
//! runway -t main e -c ci/test.yml -i repo=. -o report=./report
//! ```
//!
//! Exit codes: `0` succeeded, `1` failed (or a local error), `2` errored,
//! `3` aborted.

pub mod archive;
pub mod cli;
pub mod client;
pub mod errors;
pub mod events;
pub mod execute;
pub mod plan;
pub mod resolve;
pub mod target;
pub mod task;
pub mod utils;

// Re-export commonly used types
pub use client::{BuildServer, HttpClient};
pub use errors::{RunwayError, RunwayResult};
pub use events::{BuildStatus, EventConsumer};
pub use execute::{ExecutionOrchestrator, ExecutionOutcome, ExecutionRequest};
pub use plan::{Plan, PlanBuilder};
pub use task::TaskConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
