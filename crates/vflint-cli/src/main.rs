//! vflint CLI - vertical formatting linter for SQL CASE expressions

use vflint_cli::cli;
use vflint_cli::fix::apply_fixes;
use vflint_cli::input;
use vflint_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use vflint_core::{issue_codes, lint_sql, Dialect, Issue, LintConfig, ParseError};

use cli::{Args, OutputFormat};
use output::{render_json, FileReport, TextReport};

/// Lint violations found.
const EXIT_FAILURE: u8 = 1;
/// Configuration or input error (e.g. unreadable file, invalid config JSON).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run_lint(args) {
        Ok(has_violations) => {
            if has_violations {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("vflint: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`/`--quiet`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => LevelFilter::ERROR,
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Lint every input and print a report. Returns whether any file failed.
fn run_lint(args: Args) -> Result<bool> {
    let started_at = Instant::now();

    let lint_config = load_lint_config(args.config.as_deref(), &args.exclude_rules)?;
    let mut lint_inputs = input::read_lint_input(&args.files)?;
    let dialect: Dialect = args.dialect.into();

    tracing::info!(inputs = lint_inputs.len(), ?dialect, "linting");

    let mut fixes_per_input = vec![0; lint_inputs.len()];
    if args.fix {
        let summary = apply_fixes(&mut lint_inputs, dialect, &lint_config, args.quiet)?;
        fixes_per_input = summary.applied_per_input.clone();

        if !args.quiet {
            eprintln!(
                "vflint: applied {} auto-fix(es) across {} input(s)",
                summary.applied, summary.files_modified
            );
            if summary.skipped_due_to_parse_errors > 0 {
                eprintln!(
                    "vflint: skipped auto-fix for {} input(s) due to parse errors",
                    summary.skipped_due_to_parse_errors
                );
            }
            if summary.stdin_modified {
                eprintln!(
                    "vflint: auto-fixes were applied to stdin input for linting output only (no file was written)"
                );
            }
        }
    }

    let reports: Vec<FileReport> = lint_inputs
        .iter()
        .zip(fixes_per_input)
        .map(|(lint_input, fixes_applied)| {
            let source = &lint_input.source;
            let issues = match lint_sql(&source.content, dialect, &lint_config) {
                Ok(issues) => issues,
                Err(err) => vec![parse_error_issue(&err)],
            };
            FileReport::new(source.name.as_str(), &issues, fixes_applied)
        })
        .collect();

    let has_violations = reports.iter().any(|report| !report.passed());

    let output_str = match args.format {
        OutputFormat::Json => {
            render_json(&reports, args.compact).context("Failed to serialize lint report")?
        }
        OutputFormat::Text => TextReport {
            files: &reports,
            colored: io::stdout().is_terminal(),
            elapsed: started_at.elapsed(),
        }
        .to_string(),
    };

    write_output(&output_str)?;

    Ok(has_violations)
}

/// Read the optional JSON config file and fold `--exclude-rules` into it.
fn load_lint_config(path: Option<&Path>, exclude_rules: &[String]) -> Result<LintConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            LintConfig::from_json_str(&raw)
                .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?
        }
        None => LintConfig::default(),
    };

    config.disabled_rules.extend(
        exclude_rules
            .iter()
            .map(|rule| rule.trim())
            .filter(|rule| !rule.is_empty())
            .map(str::to_string),
    );

    Ok(config)
}

fn parse_error_issue(err: &ParseError) -> Issue {
    let issue = Issue::error(issue_codes::PARSE_ERROR, err.message.clone());
    match err.position {
        Some(pos) => issue.with_position(pos.line, pos.column),
        None => issue.with_position(1, 1),
    }
}

fn write_output(content: &str) -> Result<()> {
    io::stdout()
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure newline at end for terminal output
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
