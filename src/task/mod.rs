// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Task definitions
//!
//! Loading of task.yml and the local adjustments applied before submission:
//! environment parameter overrides, trailing arguments and privilege.

mod definition;

pub use definition::*;
