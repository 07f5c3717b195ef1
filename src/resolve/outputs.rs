// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Output resolution

use std::path::{Path, PathBuf};

use super::{absolutize, Binding};
use crate::errors::{RunwayError, RunwayResult};

/// A declared output the user asked to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    pub name: String,
    /// Local directory the output is unpacked into
    pub path: PathBuf,
}

/// Output resolver
pub struct OutputResolver;

impl OutputResolver {
    /// Select the outputs to download, in declaration order. Outputs without
    /// a binding are simply not downloaded.
    pub fn resolve(
        declared: &[&str],
        working_dir: &Path,
        overrides: &[Binding],
    ) -> RunwayResult<Vec<OutputBinding>> {
        if let Some(unknown) = overrides
            .iter()
            .find(|o| !declared.contains(&o.name.as_str()))
        {
            return Err(RunwayError::unknown_output(&unknown.name, declared));
        }

        Ok(declared
            .iter()
            .filter_map(|name| {
                overrides.iter().rev().find(|o| o.name == *name).map(|o| OutputBinding {
                    name: o.name.clone(),
                    path: absolutize(working_dir, &o.path),
                })
            })
            .collect())
    }
}
