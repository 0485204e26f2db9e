//! Builds a segment tree from tokenizer output.
//!
//! The segmenter is shallow. It recognises just enough structure
//! for layout rules: `CASE ... END` blocks and the `WHEN`/`ELSE` branches
//! inside them. Everything else stays a flat run of leaves under the file
//! root.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Whitespace};

use super::{PositionMarker, Segment, SegmentKind};
use crate::error::{ParseError, ParseErrorKind};
use crate::types::Dialect;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Tokenizes `sql` and groups the tokens into a segment tree rooted at a
/// `file` segment.
///
/// The returned root's raw text is exactly `sql`.
pub fn parse_segments(sql: &str, dialect: Dialect) -> Result<Segment, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    let mut tokenizer = Tokenizer::new(sqlparser_dialect.as_ref(), sql);
    let tokens = tokenizer
        .tokenize_with_location()
        .map_err(|err| ParseError::from(err).with_dialect(dialect))?;

    let leaves = lex_leaves(sql, &tokens).map_err(|err| err.with_dialect(dialect))?;
    let root = group_leaves(merge_whitespace(leaves));

    #[cfg(feature = "tracing")]
    debug!(
        case_expressions = root.recursive_crawl(SegmentKind::CaseExpression).len(),
        "segmented SQL source"
    );

    Ok(root)
}

/// Maps 1-based line/column locations to byte offsets.
struct LineIndex<'a> {
    sql: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(sql: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            sql.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self { sql, line_starts }
    }

    fn offset(&self, line: usize, column: usize) -> Option<usize> {
        if column == 0 {
            return None;
        }
        let line_start = *self.line_starts.get(line.checked_sub(1)?)?;
        let line_end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.sql.len());
        let line_slice = self.sql.get(line_start..line_end)?;

        // sqlparser reports columns in characters.
        match line_slice.char_indices().nth(column - 1) {
            Some((rel_offset, _)) => Some(line_start + rel_offset),
            None if line_slice.chars().count() == column - 1 => Some(line_end),
            None => None,
        }
    }
}

fn lex_leaves(sql: &str, tokens: &[TokenWithSpan]) -> Result<Vec<Segment>, ParseError> {
    let index = LineIndex::new(sql);
    let mut leaves = Vec::with_capacity(tokens.len());

    for token in tokens {
        if matches!(token.token, Token::EOF) {
            continue;
        }

        let start = &token.span.start;
        let end = &token.span.end;
        let (line, column) = (start.line as usize, start.column as usize);
        let located = index
            .offset(line, column)
            .zip(index.offset(end.line as usize, end.column as usize));
        let Some((start_offset, end_offset)) = located else {
            return Err(ParseError::new(
                ParseErrorKind::Segmenter,
                format!("token `{}` has no source location", token.token),
            )
            .at(line, column));
        };

        leaves.push(Segment::token(
            classify_token(&token.token),
            &sql[start_offset..end_offset],
            PositionMarker::new(line, column, start_offset),
        ));
    }

    Ok(leaves)
}

/// The tokenizer emits one token per whitespace character; runs are folded
/// into a single segment so a newline and the indent after it travel together.
fn merge_whitespace(leaves: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        match merged.last_mut() {
            Some(previous)
                if previous.is_type(SegmentKind::Whitespace)
                    && leaf.is_type(SegmentKind::Whitespace) =>
            {
                previous.raw.push_str(leaf.raw());
            }
            _ => merged.push(leaf),
        }
    }

    merged
}

struct Frame {
    kind: SegmentKind,
    children: Vec<Segment>,
}

impl Frame {
    fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

fn group_leaves(leaves: Vec<Segment>) -> Segment {
    let mut stack = vec![Frame::new(SegmentKind::File)];

    for leaf in leaves {
        if !leaf.is_type(SegmentKind::Keyword) {
            push_child(&mut stack, leaf);
            continue;
        }

        let keyword = leaf.raw_upper();
        match keyword.as_str() {
            "CASE" => {
                stack.push(Frame::new(SegmentKind::CaseExpression));
                push_child(&mut stack, leaf);
            }
            "WHEN" | "ELSE" if inside_case(&stack) => {
                close_clause(&mut stack);
                let kind = if keyword == "WHEN" {
                    SegmentKind::WhenClause
                } else {
                    SegmentKind::ElseClause
                };
                stack.push(Frame::new(kind));
                push_child(&mut stack, leaf);
            }
            "END" if inside_case(&stack) => {
                close_clause(&mut stack);
                push_child(&mut stack, leaf);
                close_frame(&mut stack);
            }
            _ => push_child(&mut stack, leaf),
        }
    }

    // Unterminated CASE blocks still become nodes.
    while stack.len() > 1 {
        close_frame(&mut stack);
    }

    let root = stack.pop().map(|frame| frame.children).unwrap_or_default();
    Segment::node(SegmentKind::File, root)
}

fn push_child(stack: &mut [Frame], segment: Segment) {
    if let Some(frame) = stack.last_mut() {
        frame.children.push(segment);
    }
}

fn inside_case(stack: &[Frame]) -> bool {
    stack.last().is_some_and(|frame| {
        matches!(
            frame.kind,
            SegmentKind::CaseExpression | SegmentKind::WhenClause | SegmentKind::ElseClause
        )
    })
}

fn close_clause(stack: &mut Vec<Frame>) {
    if stack
        .last()
        .is_some_and(|frame| matches!(frame.kind, SegmentKind::WhenClause | SegmentKind::ElseClause))
    {
        close_frame(stack);
    }
}

/// Pops the innermost frame into a node on its parent. Trailing whitespace and
/// comments are handed to the parent so they sit between branches.
fn close_frame(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    let Some(mut frame) = stack.pop() else {
        return;
    };

    let code_len = frame
        .children
        .iter()
        .rposition(|child| child.kind().is_code())
        .map_or(0, |index| index + 1);
    let trailing = frame.children.split_off(code_len);

    if !frame.children.is_empty() {
        push_child(stack, Segment::node(frame.kind, frame.children));
    }
    for segment in trailing {
        push_child(stack, segment);
    }
}

fn classify_token(token: &Token) -> SegmentKind {
    match token {
        Token::Word(word) if word.keyword != Keyword::NoKeyword => SegmentKind::Keyword,
        Token::Word(_) => SegmentKind::Identifier,
        Token::Number(_, _)
        | Token::SingleQuotedString(_)
        | Token::DoubleQuotedString(_)
        | Token::NationalStringLiteral(_)
        | Token::EscapedStringLiteral(_)
        | Token::HexStringLiteral(_) => SegmentKind::Literal,
        Token::Eq
        | Token::Neq
        | Token::Lt
        | Token::Gt
        | Token::LtEq
        | Token::GtEq
        | Token::Plus
        | Token::Minus
        | Token::Mul
        | Token::Div
        | Token::Mod
        | Token::StringConcat => SegmentKind::Operator,
        Token::Comma
        | Token::Period
        | Token::LParen
        | Token::RParen
        | Token::SemiColon
        | Token::LBracket
        | Token::RBracket
        | Token::LBrace
        | Token::RBrace
        | Token::Colon
        | Token::DoubleColon
        | Token::Assignment => SegmentKind::Symbol,
        Token::Whitespace(Whitespace::SingleLineComment { .. })
        | Token::Whitespace(Whitespace::MultiLineComment(_)) => SegmentKind::Comment,
        Token::Whitespace(_) => SegmentKind::Whitespace,
        _ => SegmentKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn segment(sql: &str) -> Segment {
        parse_segments(sql, Dialect::Generic).expect("segment")
    }

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(Segment::kind).collect()
    }

    #[test]
    fn groups_case_into_when_and_else_clauses() {
        let root = segment("SELECT CASE WHEN a = 1 THEN 'x' ELSE 'y' END FROM t");
        let cases = root.recursive_crawl(SegmentKind::CaseExpression);
        assert_eq!(cases.len(), 1);

        let case = cases[0];
        assert_eq!(case.raw(), "CASE WHEN a = 1 THEN 'x' ELSE 'y' END");
        assert_eq!(
            kinds(case.segments()),
            vec![
                SegmentKind::Keyword,
                SegmentKind::Whitespace,
                SegmentKind::WhenClause,
                SegmentKind::Whitespace,
                SegmentKind::ElseClause,
                SegmentKind::Whitespace,
                SegmentKind::Keyword,
            ]
        );

        let when = &case.segments()[2];
        assert_eq!(when.raw(), "WHEN a = 1 THEN 'x'");
        assert!(when.segments()[0].is_keyword("WHEN"));
        assert!(when.segments().iter().any(|s| s.is_keyword("THEN")));
    }

    #[test]
    fn positions_are_one_based_with_byte_offsets() {
        let root = segment("SELECT\n  CASE WHEN x THEN 1 END");
        let case = root.recursive_crawl(SegmentKind::CaseExpression)[0];
        assert_eq!(case.position(), PositionMarker::new(2, 3, 9));

        let then = case
            .leaves()
            .find(|leaf| leaf.is_keyword("THEN"))
            .expect("THEN");
        assert_eq!(then.position().line, 2);
        assert_eq!(then.position().column, 15);
        assert_eq!(&root.raw()[then.span().start..then.span().end], "THEN");
    }

    #[test]
    fn merges_whitespace_runs_across_newlines() {
        let root = segment("SELECT CASE WHEN a\n     THEN 1 END");
        let when = root.recursive_crawl(SegmentKind::WhenClause)[0];
        let ws = &when.segments()[3];
        assert!(ws.is_type(SegmentKind::Whitespace));
        assert_eq!(ws.raw(), "\n     ");
    }

    #[test]
    fn nested_case_lives_inside_outer_clause() {
        let root = segment("CASE WHEN a THEN CASE WHEN b THEN 1 END ELSE 2 END");
        let cases = root.recursive_crawl(SegmentKind::CaseExpression);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].raw(), "CASE WHEN b THEN 1 END");
        assert_eq!(cases[0].recursive_crawl(SegmentKind::WhenClause).len(), 2);
        assert_eq!(
            root.recursive_crawl(SegmentKind::ElseClause)[0].raw(),
            "ELSE 2"
        );
    }

    #[test]
    fn when_outside_case_stays_flat() {
        let root = segment(
            "MERGE INTO t USING s ON t.id = s.id WHEN MATCHED THEN UPDATE SET t.v = s.v",
        );
        assert!(root.recursive_crawl(SegmentKind::WhenClause).is_empty());
    }

    #[test]
    fn unterminated_case_is_closed_at_end_of_input() {
        let root = segment("SELECT CASE WHEN a THEN 1 ");
        let case = root.recursive_crawl(SegmentKind::CaseExpression)[0];
        assert_eq!(case.raw(), "CASE WHEN a THEN 1");
        assert!(root.segments().last().unwrap().is_type(SegmentKind::Whitespace));
    }

    #[test]
    fn comments_are_their_own_segments() {
        let root = segment("SELECT 1 -- noqa\n");
        assert!(root
            .segments()
            .iter()
            .any(|s| s.is_type(SegmentKind::Comment) && s.raw().contains("noqa")));
    }

    #[test]
    fn tokenizer_errors_carry_dialect_and_position() {
        let err = parse_segments("SELECT 'unterminated", Dialect::Postgres).unwrap_err();
        assert_eq!(err.dialect, Some(Dialect::Postgres));
        assert!(err.position.is_some());
    }

    #[test]
    fn line_index_handles_multibyte_columns() {
        let sql = "SELECT 'é', x\nFROM t";
        let index = LineIndex::new(sql);
        assert_eq!(index.offset(1, 1), Some(0));
        assert_eq!(index.offset(1, 13), Some(13));
        assert_eq!(index.offset(2, 1), Some(15));
        assert_eq!(index.offset(2, 7), Some(sql.len()));
        assert_eq!(index.offset(3, 1), None);
    }

    proptest! {
        #[test]
        fn segment_tree_round_trips_source(
            cond in "[a-z]{1,6}",
            value in "[0-9]{1,4}",
            gap in "[ \n]{1,4}",
        ) {
            let sql = format!(
                "SELECT CASE WHEN {cond} = 1{gap}THEN {value}{gap}ELSE 0 END AS v FROM t"
            );
            let root = segment(&sql);
            prop_assert_eq!(root.raw(), sql.as_str());
            let leaves: String = root.leaves().map(Segment::raw).collect();
            prop_assert_eq!(leaves, sql);
        }
    }
}
