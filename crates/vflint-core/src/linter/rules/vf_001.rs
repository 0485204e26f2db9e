//! VF01: Vertical formatting for CASE expressions.
//!
//! Flags `WHEN ... THEN` branches written on one line and moves `THEN` onto
//! its own line, indented one step past its `WHEN`.
//!
//! ```sql
//! -- Anti-pattern
//! CASE WHEN status = 'A' THEN 'active' END
//!
//! -- Best practice
//! CASE WHEN status = 'A'
//!     THEN 'active' END
//! ```

use crate::linter::crawler::SegmentSeekerCrawler;
use crate::linter::fix::LintFix;
use crate::linter::rule::{LintResult, LintRule, RuleContext, RuleGroup};
use crate::segments::{Segment, SegmentKind};
use crate::types::issue_codes;

/// Spaces added to the `WHEN` line's indent to place `THEN`.
pub const INDENT_SPACES: usize = 4;

const DESCRIPTION: &str =
    "Vertical formatting violation: THEN must appear on a new line after WHEN (inline not allowed).";

pub struct VerticalFormattingCase;

impl LintRule for VerticalFormattingCase {
    fn code(&self) -> &'static str {
        issue_codes::LINT_VF_001
    }

    fn name(&self) -> &'static str {
        "vertical_formatting_case"
    }

    fn description(&self) -> &'static str {
        "Enforce THEN to be on a new line after WHEN (vertical formatting for CASE expressions)."
    }

    fn groups(&self) -> &'static [RuleGroup] {
        &[
            RuleGroup::All,
            RuleGroup::Layout,
            RuleGroup::Case,
            RuleGroup::Formatting,
        ]
    }

    fn is_fix_compatible(&self) -> bool {
        true
    }

    fn crawl_behaviour(&self) -> SegmentSeekerCrawler {
        SegmentSeekerCrawler::new(&[SegmentKind::CaseExpression])
    }

    fn eval(&self, context: &RuleContext<'_>) -> Option<Vec<LintResult>> {
        let case = context.segment;
        if !case.is_type(SegmentKind::CaseExpression) {
            return None;
        }

        let case_start_line = case.position().line;
        let case_raw = case.raw();

        let violations: Vec<LintResult> = case
            .recursive_crawl(SegmentKind::WhenClause)
            .into_iter()
            .filter_map(|when_clause| {
                let segments = when_clause.segments();
                let when_token = find_keyword(segments, "WHEN")?;
                let then_token = find_keyword(segments, "THEN")?;

                if when_token.position().line != then_token.position().line {
                    return None;
                }

                let fix =
                    fix_inline_clause(when_token, then_token, segments, case_start_line, case_raw)?;
                Some(LintResult::new(then_token.clone(), DESCRIPTION).with_fixes(vec![fix]))
            })
            .collect();

        (!violations.is_empty()).then_some(violations)
    }
}

/// The last immediate child that is the given keyword.
fn find_keyword<'a>(segments: &'a [Segment], keyword: &str) -> Option<&'a Segment> {
    segments
        .iter()
        .rev()
        .find(|segment| segment.is_keyword(keyword))
}

/// Builds the fix for an inline `WHEN ... THEN`, or `None` when the clause
/// already breaks before `THEN`.
fn fix_inline_clause(
    when_token: &Segment,
    then_token: &Segment,
    segments: &[Segment],
    case_start_line: usize,
    case_raw: &str,
) -> Option<LintFix> {
    let idx_then = segments
        .iter()
        .position(|segment| std::ptr::eq(segment, then_token))?;

    let preceding_whitespace = idx_then
        .checked_sub(1)
        .map(|idx| &segments[idx])
        .filter(|segment| segment.is_type(SegmentKind::Whitespace));

    // Whitespace that already spans lines means the clause was fixed, even if
    // WHEN and THEN still report the same line.
    if preceding_whitespace.is_some_and(|ws| ws.raw().contains('\n')) {
        return None;
    }

    let when_indent = when_token
        .position()
        .line
        .checked_sub(case_start_line)
        .map_or(0, |line_index| line_indent_of(case_raw, line_index));
    let new_ws = format!("\n{}", " ".repeat(when_indent + INDENT_SPACES));

    Some(match preceding_whitespace {
        Some(ws) => LintFix::replace(ws, vec![Segment::whitespace(new_ws, ws.position())]),
        None => LintFix::create_before(
            then_token,
            vec![Segment::whitespace(new_ws, then_token.position())],
        ),
    })
}

/// Counts the leading spaces of line `line_index` (0-based) of `text`.
///
/// Out-of-range lines count as zero. Tabs are not spaces.
pub fn line_indent_of(text: &str, line_index: usize) -> usize {
    text.lines()
        .nth(line_index)
        .map_or(0, |line| line.len() - line.trim_start_matches(' ').len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{parse_segments, PositionMarker};
    use crate::types::Dialect;
    use proptest::prelude::*;
    use rstest::rstest;

    fn eval_case(segment: &Segment) -> Option<Vec<LintResult>> {
        VerticalFormattingCase.eval(&RuleContext {
            segment,
            sql: segment.raw(),
            dialect: Dialect::Generic,
        })
    }

    fn run(sql: &str) -> Vec<LintResult> {
        let root = parse_segments(sql, Dialect::Generic).expect("segment");
        let crawler = VerticalFormattingCase.crawl_behaviour();
        crawler
            .crawl(&root)
            .into_iter()
            .filter_map(|case| {
                VerticalFormattingCase.eval(&RuleContext {
                    segment: case,
                    sql,
                    dialect: Dialect::Generic,
                })
            })
            .flatten()
            .collect()
    }

    fn kw(raw: &str, line: usize, column: usize, offset: usize) -> Segment {
        Segment::token(
            SegmentKind::Keyword,
            raw,
            PositionMarker::new(line, column, offset),
        )
    }

    fn ident(raw: &str, line: usize, column: usize, offset: usize) -> Segment {
        Segment::token(
            SegmentKind::Identifier,
            raw,
            PositionMarker::new(line, column, offset),
        )
    }

    #[test]
    fn ignores_segments_that_are_not_case_expressions() {
        let root = parse_segments("SELECT CASE WHEN a THEN 1 END", Dialect::Generic).unwrap();
        assert!(eval_case(&root).is_none());

        let when = root.recursive_crawl(SegmentKind::WhenClause)[0];
        assert!(eval_case(when).is_none());
    }

    #[test]
    fn flags_inline_when_then_at_the_then_token() {
        let sql = "SELECT CASE WHEN a = 1 THEN 'x' END FROM t";
        let results = run(sql);

        assert_eq!(results.len(), 1);
        let anchor = &results[0].anchor;
        assert!(anchor.is_keyword("THEN"));
        assert_eq!(anchor.position().offset, sql.find("THEN").unwrap());
        assert_eq!(results[0].description, DESCRIPTION);
    }

    #[test]
    fn vertical_clause_is_not_flagged() {
        assert!(run("SELECT CASE WHEN a = 1\n    THEN 'x' END").is_empty());
    }

    #[test]
    fn case_without_when_clauses_is_not_flagged() {
        assert!(run("SELECT CASE END").is_empty());
    }

    #[test]
    fn inline_clause_with_whitespace_is_replaced() {
        let results = run("SELECT CASE WHEN a = 1 THEN 'x' END");
        match &results[0].fixes[..] {
            [LintFix::Replace { target, edit }] => {
                assert_eq!(target.raw(), " ");
                assert_eq!(edit[0].raw(), "\n    ");
            }
            other => panic!("expected a single replace fix, got {other:?}"),
        }
    }

    #[test]
    fn then_adjacent_to_previous_token_gets_insertion() {
        let results = run("SELECT CASE WHEN (a = 1)THEN 'x' END");
        assert_eq!(results.len(), 1);
        match &results[0].fixes[..] {
            [LintFix::CreateBefore { anchor, edit }] => {
                assert!(anchor.is_keyword("THEN"));
                assert_eq!(edit[0].raw(), "\n    ");
            }
            other => panic!("expected a single insertion fix, got {other:?}"),
        }
    }

    #[test]
    fn mixed_clauses_report_only_inline_ones() {
        let sql = "SELECT CASE\n    WHEN a = 1 THEN 'x'\n    WHEN b = 2\n        THEN 'y'\n    WHEN c = 3 THEN 'z'\nEND";
        let results = run(sql);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].anchor.position().line, 2);
        assert_eq!(results[1].anchor.position().line, 5);
        assert_eq!(results[0].fixes[0].edit_raw(), "\n        ");
        assert_eq!(results[1].fixes[0].edit_raw(), "\n        ");
    }

    #[test]
    fn first_line_indent_is_measured_from_case_raw() {
        let results = run("CASE WHEN a = 1 THEN 'x' WHEN b = 2\n     THEN 'y' END");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].anchor.position().line, 1);
        match &results[0].fixes[..] {
            [LintFix::Replace { edit, .. }] => assert_eq!(edit[0].raw(), "\n    "),
            other => panic!("unexpected fixes {other:?}"),
        }
    }

    #[test]
    fn nested_case_clauses_are_reached_by_recursion() {
        let sql = "SELECT CASE\n  WHEN a\n    THEN CASE WHEN b THEN 1 END\nEND";
        let root = parse_segments(sql, Dialect::Generic).unwrap();
        let outer = root.recursive_crawl(SegmentKind::CaseExpression)[0];
        let results = eval_case(outer).expect("nested violation");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].anchor.position().line, 3);
        // The inner WHEN sits on the outer case's third line, indented 4.
        assert_eq!(results[0].fixes[0].edit_raw(), "\n        ");
    }

    #[test]
    fn clause_missing_then_is_skipped() {
        let clause = Segment::node(
            SegmentKind::WhenClause,
            vec![
                kw("WHEN", 1, 6, 5),
                Segment::whitespace(" ", PositionMarker::new(1, 10, 9)),
                ident("a", 1, 11, 10),
            ],
        );
        let case = Segment::node(
            SegmentKind::CaseExpression,
            vec![
                kw("CASE", 1, 1, 0),
                Segment::whitespace(" ", PositionMarker::new(1, 5, 4)),
                clause,
            ],
        );
        assert!(eval_case(&case).is_none());
    }

    #[test]
    fn multiline_whitespace_before_then_is_treated_as_fixed() {
        // Positions claim one line while the whitespace before THEN spans two.
        let clause = Segment::node(
            SegmentKind::WhenClause,
            vec![
                kw("WHEN", 1, 6, 5),
                Segment::whitespace(" ", PositionMarker::new(1, 10, 9)),
                ident("a", 1, 11, 10),
                Segment::whitespace("\n    ", PositionMarker::new(1, 12, 11)),
                kw("THEN", 1, 13, 16),
            ],
        );
        let case = Segment::node(
            SegmentKind::CaseExpression,
            vec![
                kw("CASE", 1, 1, 0),
                Segment::whitespace(" ", PositionMarker::new(1, 5, 4)),
                clause,
            ],
        );
        assert!(eval_case(&case).is_none());
    }

    #[test]
    fn when_line_outside_case_raw_falls_back_to_zero_indent() {
        let clause = Segment::node(
            SegmentKind::WhenClause,
            vec![
                kw("WHEN", 7, 9, 40),
                Segment::whitespace(" ", PositionMarker::new(7, 13, 44)),
                kw("THEN", 7, 14, 45),
            ],
        );
        let case = Segment::node(
            SegmentKind::CaseExpression,
            vec![kw("CASE", 1, 1, 0), clause],
        );
        let results = eval_case(&case).expect("violation");
        assert_eq!(results[0].fixes[0].edit_raw(), "\n    ");
    }

    #[rstest]
    #[case("WHEN a THEN b", 0, 0)]
    #[case("CASE\n    WHEN a THEN b", 1, 4)]
    #[case("CASE\n\tWHEN a THEN b", 1, 0)]
    #[case("CASE\n  \tWHEN a", 1, 2)]
    #[case("CASE\n      WHEN a", 5, 0)]
    #[case("", 0, 0)]
    #[case("CASE\r\n   WHEN a", 1, 3)]
    fn measures_leading_spaces(#[case] text: &str, #[case] line: usize, #[case] expected: usize) {
        assert_eq!(line_indent_of(text, line), expected);
    }

    proptest! {
        #[test]
        fn then_indent_is_when_indent_plus_four(indent in 0usize..24) {
            let sql = format!("CASE\n{}WHEN a = 1 THEN 'x'\nEND", " ".repeat(indent));
            let results = run(&sql);
            prop_assert_eq!(results.len(), 1);
            let expected = format!("\n{}", " ".repeat(indent + INDENT_SPACES));
            prop_assert_eq!(results[0].fixes[0].edit_raw(), expected);
        }
    }
}
