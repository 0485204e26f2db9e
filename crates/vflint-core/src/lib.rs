//! Vertical formatting lint for SQL `CASE` expressions.
//!
//! The crate segments SQL into a lossless tree, runs the `VF01` rule over
//! every `case_expression`, and reports `WHEN ... THEN` branches written on a
//! single line together with text edits that move `THEN` onto its own line.

pub mod error;
pub mod linter;
pub mod segments;
pub mod types;

// Re-export main types and functions
pub use error::{ParseError, ParseErrorKind, Position};
pub use linter::config::LintConfig;
pub use linter::document::LintDocument;
pub use linter::fix::{apply_text_edits, fix_sql, FixOutcome, LintFix};
pub use linter::rule::{LintResult, LintRule, RuleContext, RuleGroup};
pub use linter::{lint_sql, Linter};
pub use segments::{parse_segments, PositionMarker, Segment, SegmentKind};

// Re-export types explicitly
pub use types::{issue_codes, Dialect, FileSource, Issue, Severity, Span, TextEdit};
