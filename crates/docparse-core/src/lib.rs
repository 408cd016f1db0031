mod capability;
mod diagnostics;
mod dispatcher;
mod document;
mod error;
mod format;
pub mod strategies;

pub use capability::{compiled_in, CapabilityRegistry};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, Level, MemorySink, TracingSink};
pub use dispatcher::Dispatcher;
pub use document::{ParsedDocument, StructuredValue, Table};
pub use error::{ExtractError, FailureKind, MalformedScope, ParseError};
pub use format::{detect, extension_of, FormatKind};
pub use strategies::{Extraction, ExtractionStrategy, SkippedUnit};

pub use docparse_config::{Backend, ConfigError, ParserConfig};

/// Parse `path` with the default configuration.
///
/// Builds a fresh [`Dispatcher`] per call; hold one instead when parsing many
/// files.
pub fn parse(path: impl AsRef<std::path::Path>) -> Result<ParsedDocument, ParseError> {
    Dispatcher::default().parse(path)
}
