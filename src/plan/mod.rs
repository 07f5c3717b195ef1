// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Build plans
//!
//! A plan is the tree of steps the build server executes. Each node holds
//! exactly one step; the JSON form is `{"location": {...}, "<step>": {...}}`.

mod builder;

pub use builder::{Endpoint, PlanBuilder, ONE_OFF_TASK_NAME};

use serde::{Deserialize, Serialize};

use crate::task::TaskConfig;

/// Resource type used for every pipe-backed get and put
pub const ARCHIVE_RESOURCE_TYPE: &str = "archive";

/// A node of the plan tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(flatten)]
    pub step: Step,
}

/// The single populated alternative of a plan node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Fetch an artifact through a pipe
    Get(GetPlan),
    /// Push an artifact through a pipe
    Put(PutPlan),
    /// Run a task
    Task(TaskPlan),
    /// Run children with no ordering between them
    Aggregate(Vec<Plan>),
    /// Run `next` only if `step` succeeded
    OnSuccess(SequencePlan),
    /// Run `next` whatever `step` did
    Ensure(SequencePlan),
}

/// Progress attribution for a plan node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub parent_id: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub parallel_group: u64,

    pub id: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Source of a pipe-backed get or put
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSource {
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPlan {
    pub name: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub source: ArchiveSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutPlan {
    pub name: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub source: ArchiveSource,

    pub params: PutParams,
}

/// Which task output directory a put archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutParams {
    pub directory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub name: String,

    #[serde(default)]
    pub privileged: bool,

    pub config: TaskConfig,
}

/// Two steps run one after the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePlan {
    pub step: Box<Plan>,
    pub next: Box<Plan>,
}

impl Plan {
    /// A node with no location of its own
    pub fn bare(step: Step) -> Self {
        Self {
            location: None,
            step,
        }
    }

    /// Canonical wire form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
