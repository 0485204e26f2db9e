//! Lint reports: sqlfluff-style text and JSON.
//!
//! Each violation carries the layout the fix would produce, so a report can
//! say where `THEN` is going before `--fix` is run.

use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use vflint_core::{Issue, Severity};

/// Lint outcome for one input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    #[serde(rename = "file")]
    pub name: String,
    /// Edits `--fix` applied before this report was taken.
    pub fixes_applied: usize,
    pub violations: Vec<Violation>,
}

impl FileReport {
    pub fn new(name: impl Into<String>, issues: &[Issue], fixes_applied: usize) -> Self {
        Self {
            name: name.into(),
            fixes_applied,
            violations: issues.iter().map(Violation::from).collect(),
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// One reported issue, positioned at its `THEN` (or parse error) location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub line: usize,
    pub column: usize,
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub fixable: bool,
    /// Column indent `THEN` gets on its new line, when a fix is proposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then_indent: Option<usize>,
}

impl From<&Issue> for Violation {
    fn from(issue: &Issue) -> Self {
        Self {
            line: issue.line.unwrap_or(1),
            column: issue.column.unwrap_or(1),
            code: issue.code.clone(),
            message: issue.message.clone(),
            severity: issue.severity,
            fixable: issue.is_fixable(),
            then_indent: issue.fixes.first().and_then(|edit| {
                let (_, indent) = edit.replacement.rsplit_once('\n')?;
                Some(indent.chars().take_while(|c| *c == ' ').count())
            }),
        }
    }
}

/// Text report over every file, ending with a run summary.
pub struct TextReport<'a> {
    pub files: &'a [FileReport],
    pub colored: bool,
    pub elapsed: Duration,
}

impl TextReport<'_> {
    fn paint_status(&self, passed: bool) -> String {
        match (passed, self.colored) {
            (true, true) => "PASS".green().to_string(),
            (true, false) => "PASS".to_string(),
            (false, true) => "FAIL".red().to_string(),
            (false, false) => "FAIL".to_string(),
        }
    }

    fn paint_code(&self, violation: &Violation) -> String {
        if !self.colored {
            return violation.code.clone();
        }
        match violation.severity {
            Severity::Error => violation.code.red().to_string(),
            Severity::Warning => violation.code.yellow().to_string(),
            Severity::Info => violation.code.blue().to_string(),
        }
    }

    fn write_file(&self, f: &mut fmt::Formatter<'_>, file: &FileReport) -> fmt::Result {
        write!(f, "== [{}] {}", file.name, self.paint_status(file.passed()))?;
        match file.fixes_applied {
            0 => writeln!(f)?,
            1 => writeln!(f, " (1 fix applied)")?,
            n => writeln!(f, " ({n} fixes applied)")?,
        }

        for violation in &file.violations {
            writeln!(
                f,
                "L:{:>4} | P:{:>4} | {} | {}",
                violation.line,
                violation.column,
                self.paint_code(violation),
                violation.message
            )?;
            if let Some(indent) = violation.then_indent {
                writeln!(
                    f,
                    "       |        |      | fix: THEN on line {} at indent {indent}",
                    violation.line + 1
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in self.files {
            self.write_file(f, file)?;
        }

        let passed = self.files.iter().filter(|file| file.passed()).count();
        let failed = self.files.len() - passed;
        let violations: Vec<&Violation> = self
            .files
            .iter()
            .flat_map(|file| &file.violations)
            .collect();
        let fixable = violations.iter().filter(|v| v.fixable).count();

        writeln!(f, "All Finished in {:.2?}!", self.elapsed)?;
        writeln!(
            f,
            "  {} passed. {} failed. {} violations found.",
            files(passed),
            files(failed),
            violations.len()
        )?;
        if fixable > 0 {
            writeln!(f, "  {fixable} fixable with --fix.")?;
        }
        Ok(())
    }
}

fn files(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{count} files")
    }
}

/// Serializes the reports as a JSON array.
pub fn render_json(files: &[FileReport], compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(files)
    } else {
        serde_json::to_string_pretty(files)
    }
}
