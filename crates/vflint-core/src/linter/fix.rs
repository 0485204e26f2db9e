//! Lint fixes and their application to SQL text.
//!
//! Rules describe fixes in terms of segments. The linter lowers them to byte
//! range [`TextEdit`]s, which are applied here in a single left-to-right pass.

use super::config::LintConfig;
use super::document::LintDocument;
use super::Linter;
use crate::error::ParseError;
use crate::segments::Segment;
use crate::types::{Dialect, Span, TextEdit};
#[cfg(feature = "tracing")]
use tracing::debug;

/// A segment-level edit proposed by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintFix {
    /// Replace `target` with the `edit` segments.
    Replace { target: Segment, edit: Vec<Segment> },
    /// Insert the `edit` segments immediately before `anchor`.
    CreateBefore { anchor: Segment, edit: Vec<Segment> },
}

impl LintFix {
    pub fn replace(target: &Segment, edit: Vec<Segment>) -> Self {
        Self::Replace {
            target: target.clone(),
            edit,
        }
    }

    pub fn create_before(anchor: &Segment, edit: Vec<Segment>) -> Self {
        Self::CreateBefore {
            anchor: anchor.clone(),
            edit,
        }
    }

    /// The text the fix writes.
    pub fn edit_raw(&self) -> String {
        let edit = match self {
            Self::Replace { edit, .. } | Self::CreateBefore { edit, .. } => edit,
        };
        edit.iter().map(Segment::raw).collect()
    }

    /// Lowers the fix to a byte-range edit of the source it was computed on.
    pub fn to_text_edit(&self) -> TextEdit {
        let span = match self {
            Self::Replace { target, .. } => target.span(),
            Self::CreateBefore { anchor, .. } => Span::at(anchor.position().offset),
        };
        TextEdit::new(span, self.edit_raw())
    }
}

/// Result of fixing a SQL document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub sql: String,
    /// Number of text edits applied across all loops.
    pub applied: usize,
    pub changed: bool,
    /// Number of lint/apply loops that changed the text.
    pub loops: usize,
}

/// Applies `edits` to `sql`.
///
/// Edits are applied in source order. Exact duplicates collapse into one, and
/// an edit overlapping one already taken is dropped; a later lint pass picks
/// it up again if it still applies. Returns the new text and the number of
/// edits applied.
pub fn apply_text_edits(sql: &str, edits: &[TextEdit]) -> (String, usize) {
    let mut ordered: Vec<&TextEdit> = edits
        .iter()
        .filter(|edit| edit.span.start <= edit.span.end && edit.span.end <= sql.len())
        .filter(|edit| sql.is_char_boundary(edit.span.start) && sql.is_char_boundary(edit.span.end))
        .collect();
    ordered.sort();
    ordered.dedup();

    let mut out = String::with_capacity(sql.len());
    let mut cursor = 0usize;
    let mut last_insert_at: Option<usize> = None;
    let mut applied = 0usize;

    for edit in ordered {
        let Span { start, end } = edit.span;
        if start < cursor {
            continue;
        }
        // Only one insertion per position, and nothing may replace text
        // directly after an insertion at the same offset.
        if last_insert_at == Some(start) {
            continue;
        }

        out.push_str(&sql[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
        last_insert_at = edit.span.is_empty().then_some(start);
        applied += 1;
    }

    out.push_str(&sql[cursor..]);
    (out, applied)
}

/// Lints `sql`, applies every fix, and repeats until the text is stable or
/// `config.runaway_limit` loops have run.
pub fn fix_sql(sql: &str, dialect: Dialect, config: &LintConfig) -> Result<FixOutcome, ParseError> {
    let linter = Linter::new(config.clone());
    let mut current = sql.to_string();
    let mut applied = 0usize;
    let mut loops = 0usize;

    while loops < config.runaway_limit {
        let document = LintDocument::parse(&current, dialect)?;
        let edits: Vec<TextEdit> = linter
            .check_document(&document)
            .into_iter()
            .flat_map(|issue| issue.fixes)
            .collect();
        if edits.is_empty() {
            break;
        }

        let (fixed, count) = apply_text_edits(&current, &edits);
        if count == 0 || fixed == current {
            break;
        }

        #[cfg(feature = "tracing")]
        debug!(loop_index = loops, edits = count, "applied lint fixes");

        current = fixed;
        applied += count;
        loops += 1;
    }

    Ok(FixOutcome {
        changed: current != sql,
        sql: current,
        applied,
        loops,
    })
}
