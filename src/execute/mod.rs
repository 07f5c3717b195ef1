// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! One-off execution
//!
//! Drives a single remote run from local bindings to an exit code: resolve
//! bindings, create pipes, submit the plan, stream inputs up while the
//! build's events are rendered, then bring outputs back down.

mod signal;

pub use signal::{watch_interrupts, Interrupts};

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use futures::{FutureExt, Stream, StreamExt};
use tokio::task::JoinSet;

use crate::archive;
use crate::client::{BuildServer, Pipe};
use crate::errors::{RunwayError, RunwayResult};
use crate::events::{BuildStatus, EventConsumer};
use crate::plan::{Endpoint, PlanBuilder};
use crate::resolve::{Binding, InputResolver, OutputBinding, OutputResolver};
use crate::task::TaskConfig;
use crate::utils::{create_spinner, print_error};

/// Everything the user asked for
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub task: TaskConfig,
    pub privileged: bool,
    /// Directory relative bindings are anchored at
    pub working_dir: PathBuf,
    pub inputs: Vec<Binding>,
    pub outputs: Vec<Binding>,
}

/// Where an execution currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Validating,
    PipesCreated,
    Submitted { build_id: u64 },
    Running { build_id: u64 },
    Finished { build_id: u64, status: BuildStatus },
}

/// How an execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub build_id: u64,
    pub status: BuildStatus,
    /// Whether an abort was requested while the build ran
    pub aborted: bool,
}

impl ExecutionOutcome {
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

/// Execution orchestrator
pub struct ExecutionOrchestrator<S> {
    server: Arc<S>,
    authorization: Option<String>,
    state: ExecutionState,
}

impl<S: BuildServer> ExecutionOrchestrator<S> {
    pub fn new(server: Arc<S>) -> Self {
        Self {
            server,
            authorization: None,
            state: ExecutionState::Validating,
        }
    }

    /// Value placed in the plan's archive sources so the server can reach
    /// the pipes with the user's credentials
    pub fn with_authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    fn transition(&mut self, state: ExecutionState) {
        tracing::info!(from = ?self.state, to = ?state, "execution state");
        self.state = state;
    }

    /// Run `request` to completion.
    ///
    /// The first item from `interrupts` after the build exists aborts it once
    /// and the final status is still awaited. Any other interrupt stops the
    /// run with [`RunwayError::Interrupted`]. Build outcomes come back as an
    /// [`ExecutionOutcome`]; an `Err` means the build could not be run or its
    /// outputs could not be saved.
    pub async fn execute<O, E, I>(
        &mut self,
        request: ExecutionRequest,
        consumer: &mut EventConsumer<O, E>,
        interrupts: I,
    ) -> RunwayResult<ExecutionOutcome>
    where
        O: Write + Send,
        E: Write + Send,
        I: Stream<Item = ()> + Unpin,
    {
        self.transition(ExecutionState::Validating);
        let mut interrupts = interrupts.fuse();

        let declared_inputs = request.task.input_names();
        let declared_outputs = request.task.output_names();
        let inputs =
            InputResolver::resolve(&declared_inputs, &request.working_dir, &request.inputs)?;
        let outputs =
            OutputResolver::resolve(&declared_outputs, &request.working_dir, &request.outputs)?;

        let (input_pipes, output_pipes) = tokio::select! {
            pipes = self.create_pipes(inputs.len(), outputs.len()) => pipes?,
            Some(()) = interrupts.next() => {
                return Err(RunwayError::Interrupted { stage: "creating pipes".into() });
            }
        };
        self.transition(ExecutionState::PipesCreated);

        let get_endpoints: Vec<Endpoint<'_>> = inputs
            .iter()
            .zip(&input_pipes)
            .map(|(input, pipe)| Endpoint {
                name: &input.name,
                url: &pipe.read_url,
            })
            .collect();
        let put_endpoints: Vec<Endpoint<'_>> = outputs
            .iter()
            .zip(&output_pipes)
            .map(|(output, pipe)| Endpoint {
                name: &output.name,
                url: &pipe.write_url,
            })
            .collect();

        let plan = PlanBuilder::new()
            .with_authorization(self.authorization.clone())
            .build(
                &request.task,
                request.privileged,
                &get_endpoints,
                &put_endpoints,
            );
        tracing::debug!(plan = ?plan, "submitting plan");

        // Once submitted the build id is needed to abort, so the request
        // itself is not raced.
        if let Some(Some(())) = interrupts.next().now_or_never() {
            return Err(RunwayError::Interrupted { stage: "submitting the build".into() });
        }
        let build = self.server.submit_build(&plan).await?;
        self.transition(ExecutionState::Submitted { build_id: build.id });
        consumer.announce(build.id)?;

        let mut uploads = JoinSet::new();
        for (input, pipe) in inputs.into_iter().zip(input_pipes) {
            let server = Arc::clone(&self.server);
            uploads.spawn(async move {
                let body = archive::pack_stream(input.path);
                server.write_pipe(pipe, body).await
            });
        }

        let mut aborted = false;
        let mut events = {
            let open = self.server.build_events(build.id);
            tokio::pin!(open);
            loop {
                tokio::select! {
                    events = &mut open => break events?,
                    Some(()) = interrupts.next() => {
                        self.interrupt(build.id, &mut aborted).await?;
                    }
                }
            }
        };
        self.transition(ExecutionState::Running { build_id: build.id });

        let consumed = {
            let consume = consumer.consume(build.id, events.as_mut());
            tokio::pin!(consume);
            loop {
                tokio::select! {
                    result = &mut consume => break result,
                    Some(()) = interrupts.next() => {
                        self.interrupt(build.id, &mut aborted).await?;
                    }
                }
            }
        };

        let status = match consumed {
            Ok(status) => status,
            Err(e @ RunwayError::EventStreamInterrupted { .. }) => {
                print_error(&e.to_string());
                BuildStatus::Errored
            }
            Err(e) => return Err(e),
        };
        self.transition(ExecutionState::Finished {
            build_id: build.id,
            status,
        });

        while let Some(joined) = uploads.try_join_next() {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "input upload failed"),
                Err(e) => tracing::warn!(error = %e, "input upload task failed"),
            }
        }
        uploads.abort_all();

        if status == BuildStatus::Succeeded {
            for (output, pipe) in outputs.into_iter().zip(output_pipes) {
                let stage = format!("downloading output '{}'", output.name);
                tokio::select! {
                    downloaded = self.download(output, pipe) => downloaded?,
                    Some(()) = interrupts.next() => {
                        return Err(RunwayError::Interrupted { stage });
                    }
                }
            }
        }

        Ok(ExecutionOutcome {
            build_id: build.id,
            status,
            aborted,
        })
    }

    async fn create_pipes(
        &self,
        inputs: usize,
        outputs: usize,
    ) -> RunwayResult<(Vec<Pipe>, Vec<Pipe>)> {
        let mut input_pipes = Vec::with_capacity(inputs);
        for _ in 0..inputs {
            input_pipes.push(self.server.create_pipe().await?);
        }
        let mut output_pipes = Vec::with_capacity(outputs);
        for _ in 0..outputs {
            output_pipes.push(self.server.create_pipe().await?);
        }
        Ok((input_pipes, output_pipes))
    }

    /// Abort the build on the first interrupt; give up waiting on the next
    async fn interrupt(&self, build_id: u64, aborted: &mut bool) -> RunwayResult<()> {
        if *aborted {
            return Err(RunwayError::Interrupted {
                stage: format!("waiting for aborted build {} to finish", build_id),
            });
        }

        *aborted = true;
        tracing::info!(build_id, "interrupted, aborting build");
        if let Err(e) = self.server.abort_build(build_id).await {
            tracing::warn!(build_id, error = %e, "abort request failed");
        }
        Ok(())
    }

    async fn download(&self, output: OutputBinding, pipe: Pipe) -> RunwayResult<()> {
        let spinner = create_spinner(&format!("downloading {}", output.name));

        let result = match self.server.read_pipe(pipe).await {
            Ok(bytes) => archive::unpack_stream(bytes, &output.path)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        spinner.finish_and_clear();

        result.map_err(|reason| RunwayError::OutputDownloadFailed {
            name: output.name,
            path: output.path,
            reason,
        })
    }
}
