// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Input resolution

use std::path::{Path, PathBuf};

use super::{absolutize, Binding};
use crate::errors::{RunwayError, RunwayResult};

/// A local directory bound to an input name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    /// Name the server will see for the fetched artifact
    pub name: String,
    /// Local directory whose contents get uploaded
    pub path: PathBuf,
}

/// Input resolver
pub struct InputResolver;

impl InputResolver {
    /// Resolve the inputs to upload.
    ///
    /// Without any `-i` flags and with at most one declared input, the
    /// invoking directory is bound under its own base name. Unknown names
    /// are reported before missing ones.
    pub fn resolve(
        declared: &[&str],
        working_dir: &Path,
        overrides: &[Binding],
    ) -> RunwayResult<Vec<InputBinding>> {
        if let Some(unknown) = overrides
            .iter()
            .find(|o| !declared.contains(&o.name.as_str()))
        {
            return Err(RunwayError::unknown_input(&unknown.name, declared));
        }

        let bindings = if overrides.is_empty() && declared.len() <= 1 {
            vec![Self::implicit(working_dir)]
        } else {
            declared
                .iter()
                .filter_map(|name| {
                    // last flag for a name wins
                    overrides.iter().rev().find(|o| o.name == *name).map(|o| InputBinding {
                        name: o.name.clone(),
                        path: absolutize(working_dir, &o.path),
                    })
                })
                .collect()
        };

        if let Some(missing) = declared
            .iter()
            .find(|name| !bindings.iter().any(|b| b.name == **name))
        {
            return Err(RunwayError::MissingRequiredInput {
                name: missing.to_string(),
            });
        }

        for binding in &bindings {
            if !binding.path.is_dir() {
                return Err(RunwayError::InputPathNotFound {
                    name: binding.name.clone(),
                    path: binding.path.clone(),
                });
            }
        }

        Ok(bindings)
    }

    fn implicit(working_dir: &Path) -> InputBinding {
        let name = working_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());

        InputBinding {
            name,
            path: working_dir.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_dir() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("fixture");
        std::fs::create_dir(&dir).unwrap();
        (tmp, dir)
    }

    fn bind(s: &str) -> Binding {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_input_binds_working_dir_by_base_name() {
        let (_tmp, dir) = build_dir();
        let inputs = InputResolver::resolve(&["fixture"], &dir, &[]).unwrap();
        assert_eq!(
            inputs,
            vec![InputBinding {
                name: "fixture".into(),
                path: dir.clone()
            }]
        );
    }

    #[test]
    fn test_single_input_named_differently_is_missing() {
        let (_tmp, dir) = build_dir();
        let err = InputResolver::resolve(&["src"], &dir, &[]).unwrap_err();
        assert_eq!(err.to_string(), "missing required input `src`");
    }

    #[test]
    fn test_unknown_input_reported() {
        let (_tmp, dir) = build_dir();
        let err =
            InputResolver::resolve(&["fixture"], &dir, &[bind("fixture=."), bind("evan=.")])
                .unwrap_err();
        assert_eq!(err.to_string(), "unknown input `evan`");
    }

    #[test]
    fn test_unknown_input_takes_precedence_over_missing() {
        let (_tmp, dir) = build_dir();
        let err = InputResolver::resolve(&["fixture"], &dir, &[bind("evan=.")]).unwrap_err();
        assert!(matches!(err, RunwayError::UnknownInput { ref name, .. } if name == "evan"));
    }

    #[test]
    fn test_multiple_inputs_require_explicit_bindings() {
        let (_tmp, dir) = build_dir();
        let declared = ["fixture", "something"];

        let err = InputResolver::resolve(&declared, &dir, &[]).unwrap_err();
        assert_eq!(err.to_string(), "missing required input `fixture`");

        let err = InputResolver::resolve(&declared, &dir, &[bind("something=.")]).unwrap_err();
        assert_eq!(err.to_string(), "missing required input `fixture`");
    }

    #[test]
    fn test_multiple_inputs_follow_declaration_order() {
        let (_tmp, dir) = build_dir();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let inputs = InputResolver::resolve(
            &["fixture", "something"],
            &dir,
            &[bind("something=sub"), bind("fixture=.")],
        )
        .unwrap();

        assert_eq!(inputs[0].name, "fixture");
        assert_eq!(inputs[0].path, dir.join("."));
        assert_eq!(inputs[1].name, "something");
        assert_eq!(inputs[1].path, dir.join("sub"));
    }

    #[test]
    fn test_bound_path_must_be_a_directory() {
        let (_tmp, dir) = build_dir();
        let err = InputResolver::resolve(&["fixture"], &dir, &[bind("fixture=nowhere")])
            .unwrap_err();
        assert!(matches!(err, RunwayError::InputPathNotFound { .. }));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let (_tmp, dir) = build_dir();
        let overrides = [bind("something=.")];
        let first = InputResolver::resolve(&["fixture", "something"], &dir, &overrides)
            .unwrap_err()
            .to_string();
        let second = InputResolver::resolve(&["fixture", "something"], &dir, &overrides)
            .unwrap_err()
            .to_string();
        assert_eq!(first, second);
    }
}
