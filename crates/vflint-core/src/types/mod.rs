//! Types for the vflint API.
//!
//! Issues and text edits are what the linter hands back to callers; dialects
//! and file sources are what callers hand in.

mod common;
mod request;

// Re-export all public types
pub use common::{issue_codes, Issue, Severity, Span, TextEdit};
pub use request::{Dialect, FileSource};
