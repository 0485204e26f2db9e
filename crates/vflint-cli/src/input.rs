//! Input handling for file reading, directory walking and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use vflint_core::FileSource;

/// A SQL source plus the path it was read from, if any.
#[derive(Debug, Clone)]
pub struct LintInput {
    pub source: FileSource,
    /// `None` for stdin.
    pub path: Option<PathBuf>,
}

/// Read lint input from files, directories or stdin.
///
/// If no paths are provided, reads from stdin. Directories are walked
/// recursively for `*.sql` files in file-name order.
pub fn read_lint_input(paths: &[PathBuf]) -> Result<Vec<LintInput>> {
    if paths.is_empty() {
        return read_from_stdin().map(|source| vec![LintInput { source, path: None }]);
    }

    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            inputs.extend(read_from_dir(path)?);
        } else {
            inputs.push(read_file(path)?);
        }
    }
    Ok(inputs)
}

/// Read SQL from stdin
fn read_from_stdin() -> Result<FileSource> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(FileSource {
        name: "<stdin>".to_string(),
        content,
    })
}

fn read_file(path: &Path) -> Result<LintInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(LintInput {
        source: FileSource {
            name: path.display().to_string(),
            content,
        },
        path: Some(path.to_path_buf()),
    })
}

fn read_from_dir(dir: &Path) -> Result<Vec<LintInput>> {
    let mut inputs = Vec::new();

    // Symlinks are not followed so a walk stays inside `dir`.
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            inputs.push(read_file(path)?);
        }
    }

    tracing::debug!(dir = %dir.display(), files = inputs.len(), "walked directory");
    Ok(inputs)
}
