// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for runway.

pub mod execute;
pub mod targets;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::resolve::Binding;

/// One-off task execution against a remote build server
#[derive(Parser, Debug)]
#[clap(
    name = "runway",
    version,
    about = "Run a task once on a remote build server, using local directories as inputs",
    long_about = None,
    after_help = "Examples:\n\
        runway -t https://ci.example.com execute -c task.yml\n\
        runway -t main e -c ci/test.yml -i repo=. -o report=./out\n\
        runway -t main e -c task.yml -- --only unit\n\n\
        See 'runway <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Server URL or name of a stored target
    #[clap(short, long, global = true, env = "RUNWAY_TARGET", value_name = "TARGET")]
    pub target: Option<String>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a task once on the target
    #[clap(alias = "e")]
    Execute(ExecuteArgs),

    /// List stored targets
    Targets,
}

#[derive(Args, Debug, Clone)]
pub struct ExecuteArgs {
    /// Task definition file
    #[clap(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Bind a task input to a local directory
    #[clap(short, long, value_name = "NAME=PATH", value_parser = Binding::parse)]
    pub input: Vec<Binding>,

    /// Download a task output into a local directory
    #[clap(short, long, value_name = "NAME=PATH", value_parser = Binding::parse)]
    pub output: Vec<Binding>,

    /// Run the task with elevated privileges
    #[clap(short, long)]
    pub privileged: bool,

    /// Extra arguments appended to the task's run arguments
    #[clap(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}
