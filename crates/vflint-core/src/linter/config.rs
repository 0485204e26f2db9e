//! Configuration for the SQL linter.

use serde::{Deserialize, Serialize};

use crate::types::issue_codes;

/// Configuration for the SQL linter.
///
/// Controls which lint rules are enabled/disabled and how fixing loops. By
/// default, all rules are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    /// Master toggle for linting (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Rule codes or names to disable (e.g., ["VF01"]).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,

    /// Maximum number of lint/fix loops before `fix_sql` gives up (default: 10).
    #[serde(default = "default_runaway_limit")]
    pub runaway_limit: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_rules: Vec::new(),
            runaway_limit: default_runaway_limit(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_runaway_limit() -> usize {
    10
}

impl LintConfig {
    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns true if a specific rule is enabled.
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        let canonical = canonicalize_rule_code(code).unwrap_or_else(|| normalize_code(code));
        self.enabled
            && !self.disabled_rules.iter().any(|rule| {
                canonicalize_rule_code(rule).unwrap_or_else(|| normalize_code(rule)) == canonical
            })
    }
}

/// Aliases accepted for each known rule, mapped to its canonical code.
const RULE_ALIASES: &[(&str, &[&str])] = &[(
    issue_codes::LINT_VF_001,
    &[
        "VF01",
        "LINT_VF_001",
        "VERTICAL_FORMATTING_CASE",
        "LAYOUT.VERTICAL_FORMATTING_CASE",
    ],
)];

/// Resolves a rule code, name or dotted name to its canonical code.
///
/// Returns `None` for unknown rules.
pub fn canonicalize_rule_code(code: &str) -> Option<String> {
    let normalized = normalize_code(code);
    RULE_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
        .map(|(canonical, _)| (*canonical).to_string())
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
