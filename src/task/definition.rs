// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Task definition structures
//!
//! Defines the schema for task.yml files. The same structures are embedded
//! verbatim in the submitted plan, so their serialized form is part of the
//! wire contract.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{RunwayError, RunwayResult};

/// Task definition from task.yml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Platform the task must run on
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform: String,

    /// Container image
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// Declared inputs, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TaskInputConfig>,

    /// Declared outputs, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TaskOutputConfig>,

    /// Parameters exposed to the task as environment variables
    #[serde(
        default,
        deserialize_with = "deserialize_params",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub params: BTreeMap<String, String>,

    /// What to run
    #[serde(default)]
    pub run: TaskRunConfig,
}

/// A declared task input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInputConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A declared task output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutputConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Executable and arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunConfig {
    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl TaskConfig {
    /// Load a task definition from a YAML file
    pub fn from_file(path: &Path) -> RunwayResult<Self> {
        if !path.is_file() {
            return Err(RunwayError::TaskConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RunwayError::InvalidTaskConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&content).map_err(|e| RunwayError::InvalidTaskConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a task definition from a YAML string
    pub fn from_yaml(yaml: &str) -> RunwayResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Declared input names, in declaration order
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name.as_str()).collect()
    }

    /// Declared output names, in declaration order
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.name.as_str()).collect()
    }

    /// Override declared params with values found by `lookup`.
    ///
    /// Only names already declared are consulted; a lookup hit replaces the
    /// value even when it is the empty string.
    pub fn apply_param_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, value) in self.params.iter_mut() {
            if let Some(overridden) = lookup(name) {
                tracing::debug!(param = %name, "param overridden from environment");
                *value = overridden;
            }
        }
    }

    /// Override declared params from the process environment
    pub fn apply_env_params(&mut self) {
        self.apply_param_overrides(|name| {
            std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
        });
    }

    /// Append trailing command-line arguments to the run arguments
    pub fn append_args<I>(&mut self, args: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.run.args.extend(args);
    }
}

/// Params are strings on the wire, but YAML authors write `X: 1` or
/// `DEBUG: true`; scalars are stringified, null becomes empty.
fn deserialize_params<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;

    raw.unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                other => {
                    return Err(D::Error::custom(format!(
                        "param '{}' must be a scalar, got {:?}",
                        name, other
                    )))
                }
            };
            Ok((name, value))
        })
        .collect()
}
