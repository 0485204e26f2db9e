//! Output formatting modules.

pub mod lint;

pub use lint::{render_json, FileReport, TextReport, Violation};
