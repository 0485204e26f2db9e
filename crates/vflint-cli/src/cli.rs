//! CLI argument parsing using clap.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// vflint - vertical formatting linter for SQL CASE expressions
#[derive(Parser, Debug)]
#[command(name = "vflint")]
#[command(about = "Check that CASE branches put THEN on its own line", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files or directories to lint (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect
    #[arg(short, long, default_value = "generic", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Apply auto-fixes in place before reporting
    #[arg(long)]
    pub fix: bool,

    /// Comma-separated list of lint rule codes to exclude (e.g., VF01)
    #[arg(long, value_delimiter = ',')]
    pub exclude_rules: Vec<String>,

    /// JSON file with lint configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for vflint_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => vflint_core::Dialect::Generic,
            DialectArg::Ansi => vflint_core::Dialect::Ansi,
            DialectArg::Bigquery => vflint_core::Dialect::Bigquery,
            DialectArg::Clickhouse => vflint_core::Dialect::Clickhouse,
            DialectArg::Databricks => vflint_core::Dialect::Databricks,
            DialectArg::Duckdb => vflint_core::Dialect::Duckdb,
            DialectArg::Hive => vflint_core::Dialect::Hive,
            DialectArg::Mssql => vflint_core::Dialect::Mssql,
            DialectArg::Mysql => vflint_core::Dialect::Mysql,
            DialectArg::Postgres => vflint_core::Dialect::Postgres,
            DialectArg::Redshift => vflint_core::Dialect::Redshift,
            DialectArg::Snowflake => vflint_core::Dialect::Snowflake,
            DialectArg::Sqlite => vflint_core::Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// sqlfluff-style report
    Text,
    /// JSON output
    Json,
}
