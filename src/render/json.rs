//! JSON rendering for extracted tables.

use crate::error::{Error, Result};
use crate::model::PageTables;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize the tables of every page. Absorbed cells become `null`.
pub fn to_json(pages: &[PageTables], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(pages),
        JsonFormat::Compact => serde_json::to_string(pages),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
