//! Segment crawlers deciding which segments a rule is evaluated on.

use crate::segments::{Segment, SegmentKind};

/// Selects every segment whose kind is in a fixed set.
///
/// Matching segments are still descended into, so nested matches are
/// selected too.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSeekerCrawler {
    kinds: &'static [SegmentKind],
}

impl SegmentSeekerCrawler {
    pub const fn new(kinds: &'static [SegmentKind]) -> Self {
        Self { kinds }
    }

    /// Returns the selected segments under `root` in document order.
    pub fn crawl<'a>(&self, root: &'a Segment) -> Vec<&'a Segment> {
        let mut selected = Vec::new();
        self.visit(root, &mut selected);
        selected
    }

    fn visit<'a>(&self, segment: &'a Segment, selected: &mut Vec<&'a Segment>) {
        if self.kinds.contains(&segment.kind()) {
            selected.push(segment);
        }
        for child in segment.segments() {
            self.visit(child, selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::parse_segments;
    use crate::types::Dialect;

    #[test]
    fn seeks_nested_case_expressions_in_document_order() {
        let root = parse_segments(
            "SELECT CASE WHEN a THEN CASE WHEN b THEN 1 END END, CASE WHEN c THEN 2 END",
            Dialect::Generic,
        )
        .expect("segment");
        let crawler = SegmentSeekerCrawler::new(&[SegmentKind::CaseExpression]);
        let found = crawler.crawl(&root);

        assert_eq!(found.len(), 3);
        assert!(found[0].raw().starts_with("CASE WHEN a"));
        assert_eq!(found[1].raw(), "CASE WHEN b THEN 1 END");
        assert_eq!(found[2].raw(), "CASE WHEN c THEN 2 END");
    }

    #[test]
    fn selects_nothing_without_matches() {
        let root = parse_segments("SELECT 1", Dialect::Generic).expect("segment");
        let crawler = SegmentSeekerCrawler::new(&[SegmentKind::WhenClause]);
        assert!(crawler.crawl(&root).is_empty());
    }
}
