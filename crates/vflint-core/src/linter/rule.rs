//! Lint rule trait and context for SQL linting.

use super::crawler::SegmentSeekerCrawler;
use super::fix::LintFix;
use crate::segments::Segment;
use crate::types::Dialect;

/// Context provided to lint rules for each crawled segment.
pub struct RuleContext<'a> {
    /// The segment selected by the rule's crawler.
    pub segment: &'a Segment,
    /// The full SQL source text.
    pub sql: &'a str,
    /// Dialect the source was segmented with.
    pub dialect: Dialect,
}

/// Classification tags a rule advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    All,
    Layout,
    Case,
    Formatting,
}

impl RuleGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Layout => "layout",
            Self::Case => "case",
            Self::Formatting => "formatting",
        }
    }
}

/// A single violation produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintResult {
    /// Segment the violation is attributed to.
    pub anchor: Segment,
    /// Human-readable description of the violation.
    pub description: String,
    /// Fixes that resolve the violation when applied together.
    pub fixes: Vec<LintFix>,
}

impl LintResult {
    pub fn new(anchor: Segment, description: impl Into<String>) -> Self {
        Self {
            anchor,
            description: description.into(),
            fixes: Vec::new(),
        }
    }

    pub fn with_fixes(mut self, fixes: Vec<LintFix>) -> Self {
        self.fixes = fixes;
        self
    }
}

/// A lint rule evaluated against the segments its crawler selects.
///
/// Rules are stateless, so one instance may be shared across threads and
/// documents.
pub trait LintRule: Send + Sync {
    /// Stable rule code (e.g., "VF01").
    fn code(&self) -> &'static str;

    /// Short machine-friendly name (e.g., "vertical_formatting_case").
    fn name(&self) -> &'static str;

    /// Longer description of what this rule checks.
    fn description(&self) -> &'static str;

    /// Classification tags for rule selection.
    fn groups(&self) -> &'static [RuleGroup];

    /// Whether the rule proposes fixes in addition to reporting.
    fn is_fix_compatible(&self) -> bool {
        false
    }

    /// Which segments the linter hands to [`LintRule::eval`].
    fn crawl_behaviour(&self) -> SegmentSeekerCrawler;

    /// Evaluates one crawled segment. `None` means nothing to report.
    fn eval(&self, context: &RuleContext<'_>) -> Option<Vec<LintResult>>;
}
