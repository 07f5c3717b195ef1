// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Terminal color utilities
//!
//! Provides consistent color schemes across the CLI.

use colored::Colorize;

use crate::events::BuildStatus;

/// Style for success messages
pub fn success(msg: &str) -> colored::ColoredString {
    msg.green()
}

/// Style for error messages
pub fn error(msg: &str) -> colored::ColoredString {
    msg.red()
}

/// Style for warning messages
pub fn warning(msg: &str) -> colored::ColoredString {
    msg.yellow()
}

/// Style for dimmed/secondary text
pub fn dimmed(msg: &str) -> colored::ColoredString {
    msg.dimmed()
}

/// Style for emphasized/bold text
pub fn bold(msg: &str) -> colored::ColoredString {
    msg.bold()
}

/// Styled name of a build status
pub fn status_label(status: BuildStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        BuildStatus::Succeeded => success(&label),
        BuildStatus::Failed => error(&label),
        BuildStatus::Errored | BuildStatus::Aborted => warning(&label),
        BuildStatus::Pending | BuildStatus::Started => dimmed(&label),
    }
}

/// Print an error cross
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg);
}
