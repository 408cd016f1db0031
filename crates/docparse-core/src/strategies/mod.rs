mod delimited;
mod markup;
mod pdf;
mod structured;
mod text;

#[cfg(feature = "backend-html")]
mod html;
#[cfg(feature = "backend-spreadsheet")]
mod spreadsheet;
#[cfg(feature = "backend-word")]
mod word;

pub use delimited::DelimitedStrategy;
pub use markup::MarkupTextStrategy;
pub use pdf::{PageSource, PdfReader, PortableDocStrategy};
pub use structured::StructuredDataStrategy;
pub use text::TextStrategy;

#[cfg(feature = "backend-html")]
pub use html::HyperTextStrategy;
#[cfg(feature = "backend-pdf")]
pub use pdf::LopdfReader;
#[cfg(feature = "backend-spreadsheet")]
pub use spreadsheet::SpreadsheetStrategy;
#[cfg(feature = "backend-word")]
pub use word::WordDocStrategy;

use std::path::Path;

use docparse_config::{Backend, ParserConfig};

use crate::diagnostics::{DiagnosticEvent, Level};
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

/// One bounded portion of a document that could not be extracted.
#[derive(Debug)]
pub struct SkippedUnit {
    /// Human-readable unit label, e.g. "page 3".
    pub unit: String,
    pub error: ExtractError,
}

/// What a strategy hands back to the dispatcher on success.
#[derive(Debug)]
pub struct Extraction {
    pub document: ParsedDocument,
    /// Units recovered from locally; the document excludes them.
    pub skipped: Vec<SkippedUnit>,
    /// Events for the dispatcher to forward to its sink.
    pub diagnostics: Vec<DiagnosticEvent>,
}

impl Extraction {
    pub fn new(document: ParsedDocument) -> Self {
        Extraction {
            document,
            skipped: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(mut self, level: Level, message: impl Into<String>) -> Self {
        self.diagnostics.push(DiagnosticEvent::new(level, message));
        self
    }
}

/// Extraction algorithm bound to one `FormatKind`.
///
/// Strategies never log; anything worth reporting goes into the returned
/// `Extraction`.
pub trait ExtractionStrategy: Send + Sync {
    /// The format this strategy handles.
    fn format(&self) -> FormatKind;

    /// Optional backend this strategy needs at runtime.
    fn required_backend(&self) -> Option<Backend> {
        self.format().required_backend()
    }

    /// Extract from a path the dispatcher has already validated.
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError>;

    /// Short name reported in dispatch diagnostics.
    fn name(&self) -> &'static str;
}

/// Build the strategy for `kind`, or `None` if it is unsupported or its
/// backend was not compiled in.
pub fn build_strategy(kind: FormatKind, config: &ParserConfig) -> Option<Box<dyn ExtractionStrategy>> {
    match kind {
        FormatKind::Text => Some(Box::new(TextStrategy::new())),
        FormatKind::Delimited => Some(Box::new(DelimitedStrategy::new(config.delimited.clone()))),
        FormatKind::StructuredData => Some(Box::new(StructuredDataStrategy::new())),
        FormatKind::Markup => Some(Box::new(MarkupTextStrategy::new())),
        #[cfg(feature = "backend-pdf")]
        FormatKind::PortableDoc => Some(Box::new(PortableDocStrategy::new(Box::new(LopdfReader)))),
        #[cfg(feature = "backend-word")]
        FormatKind::WordDoc => Some(Box::new(WordDocStrategy::new(config.word.include_tables))),
        #[cfg(feature = "backend-spreadsheet")]
        FormatKind::Spreadsheet => {
            Some(Box::new(SpreadsheetStrategy::new(config.spreadsheet.max_cells)))
        }
        #[cfg(feature = "backend-html")]
        FormatKind::HyperText => Some(Box::new(HyperTextStrategy::new())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Read a whole file as strict UTF-8.
pub(crate) fn read_utf8(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|err| {
        let valid_up_to = err.utf8_error().valid_up_to();
        ExtractError::Decode {
            line: Some(line_at(err.as_bytes(), valid_up_to)),
            message: err.utf8_error().to_string(),
        }
    })
}

/// 1-based line number of byte `offset` in `content`.
pub(crate) fn line_at(content: &[u8], offset: usize) -> u64 {
    let end = offset.min(content.len());
    content[..end].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}
