use std::path::Path;

use super::{read_utf8, Extraction, ExtractionStrategy};
use crate::document::{ParsedDocument, StructuredValue};
use crate::error::ExtractError;
use crate::format::FormatKind;

/// JSON documents. Any syntax error anywhere aborts the parse.
pub struct StructuredDataStrategy;

impl StructuredDataStrategy {
    pub fn new() -> Self {
        StructuredDataStrategy
    }
}

impl Default for StructuredDataStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for StructuredDataStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::StructuredData
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let content = read_utf8(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| ExtractError::malformed_at(e.line() as u64, e.to_string()))?;

        Ok(Extraction::new(ParsedDocument::StructuredValue(
            StructuredValue::from(value),
        )))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
