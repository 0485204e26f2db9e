//! Lint rule implementations and registry.

use super::rule::LintRule;

pub mod vf_001;

/// Returns all available lint rules.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![Box::new(vf_001::VerticalFormattingCase)]
}
