// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Targets
//!
//! A target is the build server runway talks to. It is given either as a
//! URL or as the name of an entry in the rc file, which may also carry a
//! stored token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{RunwayError, RunwayResult};

/// Environment variable overriding the rc file location
pub const RC_ENV: &str = "RUNWAYRC";

/// Default rc file name, looked up in the home directory
pub const RC_FILE: &str = ".runwayrc";

/// Stored bearer (or other scheme) token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetToken {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl TargetToken {
    /// Value for an `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.kind, self.value)
    }
}

/// A stored target entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProps {
    pub api: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default)]
    pub token: Option<TargetToken>,
}

/// The resolved server to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Base URL without a trailing slash
    pub url: String,
    pub insecure: bool,
    pub token: Option<TargetToken>,
}

impl Target {
    /// A bare URL target with no credentials
    pub fn from_url(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            insecure: false,
            token: None,
        }
    }

    /// `Authorization` value, when a token is stored
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(TargetToken::authorization)
    }
}

/// Contents of the rc file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetStore {
    #[serde(default)]
    pub targets: BTreeMap<String, TargetProps>,

    #[serde(skip)]
    path: PathBuf,
}

impl TargetStore {
    /// Default rc location: `$RUNWAYRC`, else `~/.runwayrc`
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(RC_ENV) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(RC_FILE))
            .unwrap_or_else(|| PathBuf::from(RC_FILE))
    }

    /// Load the rc file from its default location
    pub fn load() -> RunwayResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the rc file at `path`; a missing file is an empty store
    pub fn load_from(path: &Path) -> RunwayResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no rc file");
            return Ok(Self {
                targets: BTreeMap::new(),
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RunwayError::InvalidRc {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut store: Self = serde_yaml::from_str(&content).map_err(|e| RunwayError::InvalidRc {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        store.path = path.to_path_buf();

        Ok(store)
    }

    /// Resolve a `--target` value: URLs are used as-is, anything else must
    /// name a stored target.
    pub fn resolve(&self, target: &str) -> RunwayResult<Target> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(Target::from_url(target));
        }

        let props = self
            .targets
            .get(target)
            .ok_or_else(|| RunwayError::UnknownTarget {
                name: target.to_string(),
                rc: self.path.display().to_string(),
            })?;

        Ok(Target {
            url: props.api.trim_end_matches('/').to_string(),
            insecure: props.insecure,
            token: props.token.clone(),
        })
    }
}
