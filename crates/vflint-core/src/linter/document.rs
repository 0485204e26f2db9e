//! Shared linter document model.
//!
//! A `LintDocument` is constructed once per SQL source and reused across all
//! rules. It carries source text, dialect metadata, the segment tree and the
//! inline suppression directives found in comments.

use std::collections::{HashMap, HashSet};

use crate::error::ParseError;
use crate::linter::config::canonicalize_rule_code;
use crate::segments::{parse_segments, Segment, SegmentKind};
use crate::types::Dialect;

#[derive(Debug, Clone)]
enum NoqaDirective {
    All,
    Rules(HashSet<String>),
}

/// `-- noqa` suppression directives indexed by 1-based line number.
#[derive(Debug, Clone, Default)]
pub struct NoqaMap {
    directives: HashMap<usize, NoqaDirective>,
}

impl NoqaMap {
    /// Returns true if `code` is suppressed on `line`.
    pub fn is_suppressed(&self, line: usize, code: &str) -> bool {
        let Some(directive) = self.directives.get(&line) else {
            return false;
        };

        match directive {
            NoqaDirective::All => true,
            NoqaDirective::Rules(rules) => {
                let canonical = canonicalize_rule_code(code)
                    .unwrap_or_else(|| code.trim().to_ascii_uppercase());
                rules.contains(&canonical)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    fn suppress_all(&mut self, line: usize) {
        self.directives.insert(line, NoqaDirective::All);
    }

    fn suppress_rules(&mut self, line: usize, codes: HashSet<String>) {
        match self.directives.get_mut(&line) {
            Some(NoqaDirective::All) => {}
            Some(NoqaDirective::Rules(existing)) => existing.extend(codes),
            None => {
                self.directives.insert(line, NoqaDirective::Rules(codes));
            }
        }
    }
}

/// Normalized lint input model for a single SQL source.
pub struct LintDocument<'a> {
    pub sql: &'a str,
    pub dialect: Dialect,
    pub root: Segment,
    pub noqa: NoqaMap,
}

impl<'a> LintDocument<'a> {
    /// Build a lint document from source SQL and an already segmented tree.
    #[must_use]
    pub fn new(sql: &'a str, dialect: Dialect, root: Segment) -> Self {
        let noqa = extract_noqa(&root);
        Self {
            sql,
            dialect,
            root,
            noqa,
        }
    }

    /// Segment `sql` and build a lint document from it.
    pub fn parse(sql: &'a str, dialect: Dialect) -> Result<Self, ParseError> {
        let root = parse_segments(sql, dialect)?;
        Ok(Self::new(sql, dialect, root))
    }
}

fn extract_noqa(root: &Segment) -> NoqaMap {
    let mut directives = NoqaMap::default();

    for comment in root
        .leaves()
        .filter(|leaf| leaf.is_type(SegmentKind::Comment))
    {
        let Some(parsed) = parse_noqa_comment(comment.raw()) else {
            continue;
        };

        let line = comment.position().line;
        match parsed {
            ParsedNoqa::All => directives.suppress_all(line),
            ParsedNoqa::Rules(rules) => directives.suppress_rules(line, rules),
        }
    }

    directives
}

enum ParsedNoqa {
    All,
    Rules(HashSet<String>),
}

fn parse_noqa_comment(comment_text: &str) -> Option<ParsedNoqa> {
    let lowered = comment_text.to_ascii_lowercase();
    let marker_pos = lowered.find("noqa")?;
    let suffix = comment_text[marker_pos + 4..]
        .trim()
        .trim_end_matches("*/")
        .trim();

    if suffix.is_empty() {
        return Some(ParsedNoqa::All);
    }

    let Some(rule_list) = suffix.strip_prefix(':') else {
        return Some(ParsedNoqa::All);
    };
    let rule_list = rule_list.trim();
    if rule_list.is_empty() {
        return Some(ParsedNoqa::All);
    }

    let mut rules = HashSet::new();
    for item in rule_list.split(',') {
        let token = item
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ';'));
        if token.is_empty() {
            continue;
        }
        rules.insert(canonicalize_rule_code(token).unwrap_or_else(|| token.to_ascii_uppercase()));
    }

    if rules.is_empty() {
        return None;
    }

    Some(ParsedNoqa::Rules(rules))
}
