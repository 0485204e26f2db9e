//! SQL linter module.
//!
//! Rules are evaluated against the segments their crawler selects from a
//! [`LintDocument`]. Rule results are lowered to serializable [`Issue`]s with
//! text edits attached, filtered through `-- noqa` directives, then sorted
//! and de-duplicated.

pub mod config;
pub mod crawler;
pub mod document;
pub mod fix;
pub mod rule;
pub mod rules;

use config::LintConfig;
use document::LintDocument;
use rule::{LintResult, LintRule, RuleContext};
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::types::{Dialect, Issue, Severity, TextEdit};

/// The SQL linter, holding a set of rules and configuration.
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
    config: LintConfig,
}

impl Linter {
    /// Creates a new linter with the given configuration.
    pub fn new(config: LintConfig) -> Self {
        Self {
            rules: rules::all_rules(),
            config,
        }
    }

    /// Registered rules, enabled or not.
    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(Box::as_ref)
    }

    /// Checks a lint document against all enabled rules.
    pub fn check_document(&self, document: &LintDocument<'_>) -> Vec<Issue> {
        if !self.config.enabled {
            return Vec::new();
        }

        let mut issues = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.code()) {
                continue;
            }

            let crawled = rule.crawl_behaviour().crawl(&document.root);
            #[cfg(feature = "tracing")]
            trace!(rule = rule.code(), segments = crawled.len(), "crawled segments");

            for segment in crawled {
                let context = RuleContext {
                    segment,
                    sql: document.sql,
                    dialect: document.dialect,
                };
                let Some(results) = rule.eval(&context) else {
                    continue;
                };
                issues.extend(
                    results
                        .into_iter()
                        .map(|result| issue_from_result(rule.as_ref(), result)),
                );
            }
        }

        let issues = suppress_noqa_issues(issues, document);
        let issues = normalize_issues(issues);

        #[cfg(feature = "tracing")]
        debug!(issues = issues.len(), "linted document");

        issues
    }
}

/// Segments and lints `sql` with `config`.
pub fn lint_sql(sql: &str, dialect: Dialect, config: &LintConfig) -> Result<Vec<Issue>, ParseError> {
    let document = LintDocument::parse(sql, dialect)?;
    Ok(Linter::new(config.clone()).check_document(&document))
}

fn issue_from_result(rule: &dyn LintRule, result: LintResult) -> Issue {
    let position = result.anchor.position();
    let fixes: Vec<TextEdit> = if rule.is_fix_compatible() {
        result.fixes.iter().map(|fix| fix.to_text_edit()).collect()
    } else {
        Vec::new()
    };

    Issue::warning(rule.code(), result.description)
        .with_span(result.anchor.span())
        .with_position(position.line, position.column)
        .with_fixes(fixes)
}

fn normalize_issues(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|left, right| issue_sort_key(left).cmp(&issue_sort_key(right)));
    issues.dedup_by(|left, right| {
        left.span.is_some()
            && right.span.is_some()
            && left.span == right.span
            && left.severity == right.severity
            && left.code == right.code
            && left.message == right.message
    });
    issues
}

fn issue_sort_key(issue: &Issue) -> (usize, usize, u8, &str, &str) {
    (
        issue.span.map_or(usize::MAX, |span| span.start),
        issue.span.map_or(usize::MAX, |span| span.end),
        severity_rank(issue.severity),
        issue.code.as_str(),
        issue.message.as_str(),
    )
}

const fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}

fn suppress_noqa_issues(issues: Vec<Issue>, document: &LintDocument<'_>) -> Vec<Issue> {
    if document.noqa.is_empty() {
        return issues;
    }

    issues
        .into_iter()
        .filter(|issue| {
            let Some(line) = issue.line else {
                return true;
            };
            !document.noqa.is_suppressed(line, &issue.code)
        })
        .collect()
}
