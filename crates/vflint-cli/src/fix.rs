//! In-place auto-fix for lint inputs.
//!
//! Fixes come from the core fix loop; this module decides what to do with
//! the result: rewrite files on disk, keep stdin fixes in memory for the
//! report, and skip sources the segmenter rejects.

use anyhow::{Context, Result};
use std::fs;
use vflint_core::{fix_sql, Dialect, LintConfig};

use crate::input::LintInput;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixSummary {
    /// Total edits applied across all inputs.
    pub applied: usize,
    /// Edits applied to each input, in input order.
    pub applied_per_input: Vec<usize>,
    pub files_modified: usize,
    pub skipped_due_to_parse_errors: usize,
    /// Fixes were applied to stdin content, which is never written back.
    pub stdin_modified: bool,
}

/// Fix every input, replacing its content and writing changed files back.
pub fn apply_fixes(
    inputs: &mut [LintInput],
    dialect: Dialect,
    config: &LintConfig,
    quiet: bool,
) -> Result<FixSummary> {
    let mut summary = FixSummary {
        applied_per_input: vec![0; inputs.len()],
        ..FixSummary::default()
    };

    for (index, input) in inputs.iter_mut().enumerate() {
        let outcome = match fix_sql(&input.source.content, dialect, config) {
            Ok(outcome) => outcome,
            Err(err) => {
                summary.skipped_due_to_parse_errors += 1;
                if !quiet {
                    eprintln!(
                        "vflint: warning: unable to auto-fix {}: {err}",
                        input.source.name
                    );
                }
                continue;
            }
        };

        if !outcome.changed {
            continue;
        }

        tracing::info!(
            file = %input.source.name,
            edits = outcome.applied,
            loops = outcome.loops,
            "fixed source"
        );

        summary.applied += outcome.applied;
        summary.applied_per_input[index] = outcome.applied;
        summary.files_modified += 1;
        input.source.content = outcome.sql;

        if let Some(path) = &input.path {
            fs::write(path, &input.source.content)
                .with_context(|| format!("Failed to write fixed SQL to {}", path.display()))?;
        } else {
            summary.stdin_modified = true;
        }
    }

    Ok(summary)
}
