//! Segment tree model.
//!
//! A segment tree is a lossless, lightly structured view of SQL source: every
//! byte of the input belongs to exactly one leaf segment, and leaves are
//! grouped into `case_expression`, `when_clause` and `else_clause` nodes. Lint
//! rules read the tree; they never mutate it.

mod builder;

pub use builder::parse_segments;

use crate::types::Span;

/// Type tag of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    File,
    CaseExpression,
    WhenClause,
    ElseClause,
    Keyword,
    Identifier,
    Literal,
    Operator,
    Symbol,
    Comment,
    Whitespace,
    Other,
}

impl SegmentKind {
    /// The snake_case type tag, as used in rule documentation and debug output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::CaseExpression => "case_expression",
            Self::WhenClause => "when_clause",
            Self::ElseClause => "else_clause",
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::Literal => "literal",
            Self::Operator => "operator",
            Self::Symbol => "symbol",
            Self::Comment => "comment",
            Self::Whitespace => "whitespace",
            Self::Other => "other",
        }
    }

    /// Whitespace and comments carry no code.
    pub fn is_code(self) -> bool {
        !matches!(self, Self::Whitespace | Self::Comment)
    }
}

/// Location of the first character of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionMarker {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in characters (1-indexed).
    pub column: usize,
    /// Byte offset from the start of the source.
    pub offset: usize,
}

impl PositionMarker {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for PositionMarker {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

/// A node in the segment tree.
///
/// Leaves carry their exact source text. The raw text of a composite node is
/// the concatenation of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    kind: SegmentKind,
    raw: String,
    position: PositionMarker,
    children: Vec<Segment>,
}

impl Segment {
    /// Creates a leaf segment.
    pub fn token(kind: SegmentKind, raw: impl Into<String>, position: PositionMarker) -> Self {
        Self {
            kind,
            raw: raw.into(),
            position,
            children: Vec::new(),
        }
    }

    /// Creates a whitespace leaf, as emitted by fixes.
    pub fn whitespace(raw: impl Into<String>, position: PositionMarker) -> Self {
        Self::token(SegmentKind::Whitespace, raw, position)
    }

    /// Creates a composite segment positioned at its first child.
    pub fn node(kind: SegmentKind, children: Vec<Segment>) -> Self {
        let position = children
            .first()
            .map(|child| child.position)
            .unwrap_or_default();
        let raw = children.iter().map(|child| child.raw.as_str()).collect();
        Self {
            kind,
            raw,
            position,
            children,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn is_type(&self, kind: SegmentKind) -> bool {
        self.kind == kind
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn raw_upper(&self) -> String {
        self.raw.to_uppercase()
    }

    pub fn position(&self) -> PositionMarker {
        self.position
    }

    /// Immediate children, in document order.
    pub fn segments(&self) -> &[Segment] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Byte span of the segment within the source.
    pub fn span(&self) -> Span {
        Span::new(self.position.offset, self.position.offset + self.raw.len())
    }

    /// Returns true for a keyword leaf whose text matches `keyword` case-insensitively.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == SegmentKind::Keyword && self.raw.eq_ignore_ascii_case(keyword)
    }

    /// All segments of `kind` at or below this one, in document order.
    ///
    /// Descent is unrestricted: matches nested inside other matches are
    /// included.
    pub fn recursive_crawl(&self, kind: SegmentKind) -> Vec<&Segment> {
        let mut found = Vec::new();
        self.collect_kind(kind, &mut found);
        found
    }

    fn collect_kind<'a>(&'a self, kind: SegmentKind, found: &mut Vec<&'a Segment>) {
        if self.kind == kind {
            found.push(self);
        }
        for child in &self.children {
            child.collect_kind(kind, found);
        }
    }

    /// Iterates over every leaf in document order.
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Segment> + '_> {
        if self.is_leaf() {
            Box::new(std::iter::once(self))
        } else {
            Box::new(self.children.iter().flat_map(Segment::leaves))
        }
    }
}
