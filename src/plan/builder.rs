// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Plan construction
//!
//! Location IDs are handed out in construction order and the server checks
//! them, so the order below is fixed: input aggregate group, one ID per
//! get, the task, then the output aggregate group and one ID per put.

use super::{
    ArchiveSource, GetPlan, Location, Plan, PutParams, PutPlan, SequencePlan, Step, TaskPlan,
    ARCHIVE_RESOURCE_TYPE,
};
use crate::task::TaskConfig;

/// Name of the task step in every one-off plan
pub const ONE_OFF_TASK_NAME: &str = "one-off";

/// An artifact name paired with the pipe URL that carries it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

/// Plan builder
#[derive(Debug, Default)]
pub struct PlanBuilder {
    last_id: u64,
    authorization: Option<String>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed an `Authorization` value in every get and put source
    pub fn with_authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization;
        self
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn source(&self, url: &str) -> ArchiveSource {
        ArchiveSource {
            uri: url.to_string(),
            authorization: self.authorization.clone(),
        }
    }

    /// Build the one-off plan.
    ///
    /// `inputs` are fetched by the server from the pipes' read side; `outputs`
    /// are pushed by the server to the pipes' write side.
    pub fn build(
        mut self,
        task: &TaskConfig,
        privileged: bool,
        inputs: &[Endpoint<'_>],
        outputs: &[Endpoint<'_>],
    ) -> Plan {
        let input_group = self.next_id();
        let mut gets = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = self.next_id();
            gets.push(Plan {
                location: Some(Location {
                    parent_id: 0,
                    parallel_group: input_group,
                    id,
                }),
                step: Step::Get(GetPlan {
                    name: input.name.to_string(),
                    resource_type: ARCHIVE_RESOURCE_TYPE.to_string(),
                    source: self.source(input.url),
                }),
            });
        }

        let task_id = self.next_id();
        let task_plan = Plan {
            location: Some(Location {
                parent_id: 0,
                parallel_group: 0,
                id: task_id,
            }),
            step: Step::Task(TaskPlan {
                name: ONE_OFF_TASK_NAME.to_string(),
                privileged,
                config: task.clone(),
            }),
        };

        let next = if outputs.is_empty() {
            task_plan
        } else {
            let output_group = self.next_id();
            let mut puts = Vec::with_capacity(outputs.len());
            for output in outputs {
                let id = self.next_id();
                puts.push(Plan {
                    location: Some(Location {
                        parent_id: 0,
                        parallel_group: output_group,
                        id,
                    }),
                    step: Step::Put(PutPlan {
                        name: output.name.to_string(),
                        resource_type: ARCHIVE_RESOURCE_TYPE.to_string(),
                        source: self.source(output.url),
                        params: PutParams {
                            directory: output.name.to_string(),
                        },
                    }),
                });
            }

            Plan::bare(Step::Ensure(SequencePlan {
                step: Box::new(task_plan),
                next: Box::new(Plan::bare(Step::Aggregate(puts))),
            }))
        };

        Plan::bare(Step::OnSuccess(SequencePlan {
            step: Box::new(Plan::bare(Step::Aggregate(gets))),
            next: Box::new(next),
        }))
    }
}
