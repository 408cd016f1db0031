use std::path::Path;

use super::{Extraction, ExtractionStrategy};
use crate::diagnostics::Level;
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

/// Plain text: strict UTF-8 first, then one lossy retry.
pub struct TextStrategy;

impl TextStrategy {
    pub fn new() -> Self {
        TextStrategy
    }
}

impl Default for TextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for TextStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::Text
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let bytes = std::fs::read(path)?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Extraction::new(ParsedDocument::Text(text))),
            Err(err) => {
                let offset = err.utf8_error().valid_up_to();
                // Invalid sequences become U+FFFD rather than failing the parse.
                let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
                Ok(Extraction::new(ParsedDocument::Text(text)).with_diagnostic(
                    Level::Warning,
                    format!(
                        "UTF-8 decoding failed for {} at byte {}; fell back to lossy decoding",
                        path.display(),
                        offset
                    ),
                ))
            }
        }
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
