// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Targets command - list stored targets

use miette::Result;

use crate::target::TargetStore;
use crate::utils::{bold, dimmed};

/// Print every stored target
pub async fn run(verbose: bool) -> Result<()> {
    let path = TargetStore::default_path();
    let store = TargetStore::load_from(&path)?;

    if verbose {
        eprintln!("{}", dimmed(&format!("reading {}", path.display())));
    }

    if store.targets.is_empty() {
        println!("{}", dimmed(&format!("no targets in {}", path.display())));
        return Ok(());
    }

    for (name, props) in &store.targets {
        let mut notes = Vec::new();
        if props.insecure {
            notes.push("insecure");
        }
        if props.token.is_some() {
            notes.push("token");
        }

        if notes.is_empty() {
            println!("{}  {}", bold(name), props.api);
        } else {
            println!("{}  {}  {}", bold(name), props.api, dimmed(&notes.join(", ")));
        }
    }

    Ok(())
}
