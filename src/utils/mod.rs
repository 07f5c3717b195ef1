// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Utility modules
//!
//! Common utilities for the runway CLI.

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
