// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Error types
//!
//! Every failure runway can report before or around a remote build. Remote
//! build outcomes (failed, errored) are not errors; they travel as
//! [`crate::events::BuildStatus`] values and become exit codes.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for runway operations
pub type RunwayResult<T> = Result<T, RunwayError>;

/// Broad classification of a [`RunwayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad flags, unknown or missing bindings, unreadable task config
    Usage,
    /// The server could not be reached or answered unexpectedly
    Transport,
    /// The server refused the submitted plan
    ConfigRejected,
    /// Local filesystem trouble after the build already finished
    LocalIo,
    /// The user interrupted the run
    Cancelled,
}

/// Main error type for runway
#[derive(Error, Debug, Diagnostic)]
pub enum RunwayError {
    // ─────────────────────────────────────────────────────────────────────────
    // Usage Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("unknown input `{name}`")]
    #[diagnostic(
        code(runway::unknown_input),
        help("Declared inputs: {declared}")
    )]
    UnknownInput { name: String, declared: String },

    #[error("unknown output '{name}'")]
    #[diagnostic(
        code(runway::unknown_output),
        help("Declared outputs: {declared}")
    )]
    UnknownOutput { name: String, declared: String },

    #[error("missing required input `{name}`")]
    #[diagnostic(
        code(runway::missing_required_input),
        help("Bind it with '-i {name}=<path>'")
    )]
    MissingRequiredInput { name: String },

    #[error("input `{name}` points at '{path}', which is not a directory")]
    #[diagnostic(code(runway::input_path_not_found))]
    InputPathNotFound { name: String, path: PathBuf },

    #[error("invalid binding '{value}': expected name=path")]
    #[diagnostic(code(runway::invalid_binding))]
    InvalidBinding { value: String },

    #[error("Task config not found: {path}")]
    #[diagnostic(
        code(runway::task_config_not_found),
        help("Pass the task definition with '-c path/to/task.yml'")
    )]
    TaskConfigNotFound { path: PathBuf },

    #[error("Invalid task config '{path}': {reason}")]
    #[diagnostic(code(runway::invalid_task_config))]
    InvalidTaskConfig { path: PathBuf, reason: String },

    #[error("Unknown target '{name}'")]
    #[diagnostic(
        code(runway::unknown_target),
        help("Pass a URL with '-t https://ci.example.com' or add '{name}' to {rc}")
    )]
    UnknownTarget { name: String, rc: String },

    #[error("No target specified")]
    #[diagnostic(
        code(runway::no_target),
        help("Pass '-t <url-or-name>' or set RUNWAY_TARGET")
    )]
    NoTarget,

    #[error("Failed to read targets from '{path}': {reason}")]
    #[diagnostic(code(runway::invalid_rc))]
    InvalidRc { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to create pipe: {reason}")]
    #[diagnostic(code(runway::pipe_creation_failed))]
    PipeCreationFailed { reason: String },

    #[error("Failed to submit build: {reason}")]
    #[diagnostic(code(runway::build_submission_failed))]
    BuildSubmissionFailed { reason: String },

    #[error("Failed to open event stream for build {build_id}: {reason}")]
    #[diagnostic(code(runway::event_stream_failed))]
    EventStreamFailed { build_id: u64, reason: String },

    #[error("Event stream for build {build_id} ended before the build finished: {reason}")]
    #[diagnostic(code(runway::event_stream_interrupted))]
    EventStreamInterrupted { build_id: u64, reason: String },

    #[error("Failed to abort build {build_id}: {reason}")]
    #[diagnostic(code(runway::abort_failed))]
    AbortFailed { build_id: u64, reason: String },

    #[error("Failed to upload to pipe '{pipe}': {reason}")]
    #[diagnostic(code(runway::upload_failed))]
    UploadFailed { pipe: String, reason: String },

    #[error("Failed to read pipe '{pipe}': {reason}")]
    #[diagnostic(code(runway::pipe_read_failed))]
    PipeReadFailed { pipe: String, reason: String },

    #[error("HTTP error: {message}")]
    #[diagnostic(code(runway::http_error))]
    Http { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Server Verdicts
    // ─────────────────────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(runway::build_config_invalid))]
    BuildConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Cancellation
    // ─────────────────────────────────────────────────────────────────────────
    #[error("interrupted while {stage}")]
    #[diagnostic(code(runway::interrupted))]
    Interrupted { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Local IO Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to download output '{name}' into '{path}': {reason}")]
    #[diagnostic(
        code(runway::output_download_failed),
        help("The build itself succeeded; only the local copy of its output failed")
    )]
    OutputDownloadFailed {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(runway::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(runway::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(runway::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for RunwayError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for RunwayError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for RunwayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<reqwest::Error> for RunwayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http { message: e.to_string() }
    }
}

impl RunwayError {
    /// Create an unknown-input error listing what the task does declare
    pub fn unknown_input(name: &str, declared: &[&str]) -> Self {
        Self::UnknownInput {
            name: name.to_string(),
            declared: Self::list(declared),
        }
    }

    /// Create an unknown-output error listing what the task does declare
    pub fn unknown_output(name: &str, declared: &[&str]) -> Self {
        Self::UnknownOutput {
            name: name.to_string(),
            declared: Self::list(declared),
        }
    }

    fn list(names: &[&str]) -> String {
        if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownInput { .. }
            | Self::UnknownOutput { .. }
            | Self::MissingRequiredInput { .. }
            | Self::InputPathNotFound { .. }
            | Self::InvalidBinding { .. }
            | Self::TaskConfigNotFound { .. }
            | Self::InvalidTaskConfig { .. }
            | Self::UnknownTarget { .. }
            | Self::NoTarget
            | Self::InvalidRc { .. }
            | Self::Yaml { .. } => ErrorCategory::Usage,

            Self::PipeCreationFailed { .. }
            | Self::BuildSubmissionFailed { .. }
            | Self::EventStreamFailed { .. }
            | Self::EventStreamInterrupted { .. }
            | Self::AbortFailed { .. }
            | Self::UploadFailed { .. }
            | Self::PipeReadFailed { .. }
            | Self::Http { .. }
            | Self::Json { .. } => ErrorCategory::Transport,

            Self::BuildConfigInvalid { .. } => ErrorCategory::ConfigRejected,

            Self::OutputDownloadFailed { .. } | Self::Io { .. } => ErrorCategory::LocalIo,

            Self::Interrupted { .. } => ErrorCategory::Cancelled,
        }
    }
}
