// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Input and output resolution
//!
//! Reconciles the task's declared inputs and outputs with the `name=path`
//! bindings given on the command line. Everything here is local: it runs
//! before any request reaches the server.

mod inputs;
mod outputs;

pub use inputs::{InputBinding, InputResolver};
pub use outputs::{OutputBinding, OutputResolver};

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::RunwayError;

/// A raw `name=path` flag value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub path: PathBuf,
}

impl Binding {
    /// Parse `name=path`; used as a clap value parser
    pub fn parse(value: &str) -> Result<Self, RunwayError> {
        value.parse()
    }
}

impl FromStr for Binding {
    type Err = RunwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            }),
            _ => Err(RunwayError::InvalidBinding {
                value: s.to_string(),
            }),
        }
    }
}

/// Anchor relative binding paths at the invoking directory
fn absolutize(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}
