use std::path::Path;

use super::{Extraction, ExtractionStrategy, SkippedUnit};
use crate::diagnostics::Level;
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

/// An opened portable document, addressable page by page.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the page at zero-based `index`.
    fn page_text(&self, index: usize) -> Result<String, String>;
}

/// Opens portable documents. Failing to open is a whole-document failure.
pub trait PdfReader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, ExtractError>;
}

/// Page-ordered text extraction with per-page fault isolation.
pub struct PortableDocStrategy {
    reader: Box<dyn PdfReader>,
}

impl PortableDocStrategy {
    pub fn new(reader: Box<dyn PdfReader>) -> Self {
        PortableDocStrategy { reader }
    }
}

impl ExtractionStrategy for PortableDocStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::PortableDoc
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let source = self.reader.open(path)?;
        let page_count = source.page_count();

        let mut text = String::new();
        let mut skipped = Vec::new();

        for index in 0..page_count {
            match source.page_text(index) {
                Ok(page) => {
                    let page = page.trim_end_matches(['\r', '\n']);
                    if !page.is_empty() {
                        text.push_str(page);
                        text.push('\n');
                    }
                }
                Err(reason) => skipped.push(SkippedUnit {
                    unit: format!("page {}", index + 1),
                    error: ExtractError::unit(reason),
                }),
            }
        }

        let mut extraction = Extraction::new(ParsedDocument::Text(text.trim().to_string()))
            .with_diagnostic(
                Level::Info,
                format!("Read {} pages from PDF: {}", page_count, path.display()),
            );
        extraction.skipped = skipped;
        Ok(extraction)
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

#[cfg(feature = "backend-pdf")]
pub use self::lopdf_reader::LopdfReader;

#[cfg(feature = "backend-pdf")]
mod lopdf_reader {
    use std::fs::File;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::Path;

    use lopdf::Document;

    use super::{PageSource, PdfReader};
    use crate::error::ExtractError;

    /// `PdfReader` backed by lopdf.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LopdfReader;

    struct LopdfPages {
        document: Document,
        page_numbers: Vec<u32>,
    }

    impl PdfReader for LopdfReader {
        fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, ExtractError> {
            let file = File::open(path)?;
            let document = Document::load_from(file)
                .map_err(|e| ExtractError::malformed(format!("cannot open PDF: {}", e)))?;
            document
                .catalog()
                .map_err(|e| ExtractError::malformed(format!("missing document catalog: {}", e)))?;
            let page_numbers = document.get_pages().keys().copied().collect();

            Ok(Box::new(LopdfPages {
                document,
                page_numbers,
            }))
        }
    }

    impl PageSource for LopdfPages {
        fn page_count(&self) -> usize {
            self.page_numbers.len()
        }

        fn page_text(&self, index: usize) -> Result<String, String> {
            let page = *self
                .page_numbers
                .get(index)
                .ok_or_else(|| format!("page index {} out of range", index))?;

            // lopdf can panic on malformed content streams.
            panic::catch_unwind(AssertUnwindSafe(|| self.document.extract_text(&[page])))
                .map_err(|_| "text extraction panicked".to_string())?
                .map_err(|e| e.to_string())
        }
    }
}
