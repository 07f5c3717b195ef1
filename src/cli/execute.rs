// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Execute command - run a task once on the target

use miette::Result;
use std::sync::Arc;

use super::ExecuteArgs;
use crate::client::HttpClient;
use crate::errors::RunwayError;
use crate::events::EventConsumer;
use crate::execute::{watch_interrupts, ExecutionOrchestrator, ExecutionRequest};
use crate::target::TargetStore;
use crate::task::TaskConfig;
use crate::utils::print_warning;

/// Execute the task, returning the process exit code
pub async fn run(target: Option<String>, args: ExecuteArgs) -> Result<i32> {
    let mut task = TaskConfig::from_file(&args.config)?;
    task.apply_env_params();
    task.append_args(args.args);

    let target = target.ok_or(RunwayError::NoTarget)?;
    let target = TargetStore::load()?.resolve(&target)?;
    eprintln!("currently targeting {}", target.url);

    let working_dir = std::env::current_dir().map_err(|e| {
        miette::miette!("Failed to get current directory: {}", e)
    })?;

    let interrupts = watch_interrupts()
        .map_err(|e| miette::miette!("Failed to install signal handlers: {}", e))?;

    let server = Arc::new(HttpClient::new(&target)?);
    let mut orchestrator =
        ExecutionOrchestrator::new(server).with_authorization(target.authorization());
    let mut consumer = EventConsumer::stdio();

    let outcome = orchestrator
        .execute(
            ExecutionRequest {
                task,
                privileged: args.privileged,
                working_dir,
                inputs: args.input,
                outputs: args.output,
            },
            &mut consumer,
            interrupts,
        )
        .await
        .map_err(|e| {
            tracing::debug!(category = ?e.category(), "execution failed");
            e
        })?;

    if outcome.aborted {
        print_warning(&format!("build {} was interrupted", outcome.build_id));
    }

    Ok(outcome.exit_code())
}
