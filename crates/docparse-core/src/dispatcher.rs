use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docparse_config::{Backend, ConfigError, ParserConfig};

use crate::capability::CapabilityRegistry;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink};
use crate::document::ParsedDocument;
use crate::error::{FailureKind, ParseError};
use crate::format::{self, FormatKind};
use crate::strategies::{build_strategy, Extraction, ExtractionStrategy};

/// Single entry point: path in, `ParsedDocument` or `ParseError` out.
///
/// `parse` holds no mutable state, so one dispatcher can serve any number of
/// sequential or parallel callers.
pub struct Dispatcher {
    registry: CapabilityRegistry,
    strategies: HashMap<FormatKind, Box<dyn ExtractionStrategy>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Dispatcher {
    /// Dispatcher over the process-wide capability registry, logging through
    /// `tracing`.
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        let registry = CapabilityRegistry::initialize(&config.backends).clone();
        Self::with_registry(config, registry, Arc::new(TracingSink))
    }

    /// Dispatcher with an explicit registry and sink.
    pub fn with_registry(
        config: &ParserConfig,
        registry: CapabilityRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        config.validate_or_err()?;
        Ok(Self::build(config, registry, sink))
    }

    fn build(
        config: &ParserConfig,
        registry: CapabilityRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let strategies = FormatKind::SUPPORTED
            .into_iter()
            .filter_map(|kind| build_strategy(kind, config).map(|strategy| (kind, strategy)))
            .collect();

        Dispatcher {
            registry,
            strategies,
            sink,
        }
    }

    /// Replace the sink events are emitted to.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Install `strategy` for its format, replacing the built-in one.
    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.insert(strategy.format(), strategy);
    }

    pub fn is_available(&self, backend: Backend) -> bool {
        self.registry.is_available(backend)
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Whether `path` would get past detection and the capability check.
    pub fn supports(&self, path: impl AsRef<Path>) -> bool {
        let kind = format::detect(path.as_ref());
        kind != FormatKind::Unsupported && matches!(self.backend_ready(kind), Ok(Some(_)))
    }

    /// Parse one file. Every outcome is reported to the sink; none panics.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<ParsedDocument, ParseError> {
        let path = path.as_ref();

        match self.run(path) {
            Ok(extraction) => {
                self.forward(path, &extraction);
                self.emit(DiagnosticEvent::info(format!(
                    "Finished parsing: {} ({})",
                    file_name(path),
                    extraction.document.summary()
                )));
                Ok(extraction.document)
            }
            Err(err) => {
                let event = match err.kind() {
                    FailureKind::UnsupportedFormat => DiagnosticEvent::warning(err.to_string()),
                    _ => DiagnosticEvent::error(format!(
                        "Failed to parse {}: {}",
                        file_name(path),
                        err
                    )),
                };
                self.emit(event);
                Err(err)
            }
        }
    }

    /// Validating → Detecting → CapabilityCheck → Extracting.
    fn run(&self, path: &Path) -> Result<Extraction, ParseError> {
        validate(path)?;

        let kind = format::detect(path);
        if kind == FormatKind::Unsupported {
            return Err(ParseError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: display_extension(path),
            });
        }

        let strategy = match self.backend_ready(kind) {
            Ok(Some(strategy)) => strategy,
            Ok(None) => {
                return Err(ParseError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: display_extension(path),
                })
            }
            Err(backend) => {
                return Err(ParseError::BackendUnavailable {
                    path: path.to_path_buf(),
                    format: kind,
                    backend,
                })
            }
        };

        self.emit(DiagnosticEvent::info(format!(
            "Attempting to parse file: {} (detected type: {}, strategy: {})",
            path.display(),
            kind,
            strategy.name()
        )));

        strategy.extract(path).map_err(|source| ParseError::Extraction {
            path: path.to_path_buf(),
            format: kind,
            source,
        })
    }

    /// The strategy for `kind` if its backend is usable, else the missing
    /// backend.
    fn backend_ready(
        &self,
        kind: FormatKind,
    ) -> Result<Option<&dyn ExtractionStrategy>, Backend> {
        let strategy = self.strategies.get(&kind);
        let backend = strategy
            .and_then(|s| s.required_backend())
            .or_else(|| kind.required_backend());

        if let Some(backend) = backend {
            if !self.registry.is_available(backend) {
                return Err(backend);
            }
        }

        match (strategy, backend) {
            (Some(strategy), _) => Ok(Some(strategy.as_ref())),
            // Registry says yes but the backend was not compiled in.
            (None, Some(backend)) => Err(backend),
            (None, None) => Ok(None),
        }
    }

    fn forward(&self, path: &Path, extraction: &Extraction) {
        for event in &extraction.diagnostics {
            self.emit(event.clone());
        }
        for skipped in &extraction.skipped {
            self.emit(DiagnosticEvent::warning(format!(
                "Could not extract text from {} in {}: {}",
                skipped.unit,
                path.display(),
                skipped.error
            )));
        }
    }

    fn emit(&self, event: DiagnosticEvent) {
        self.sink.emit(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        let config = ParserConfig::default();
        let registry = CapabilityRegistry::initialize(&config.backends).clone();
        Self::build(&config, registry, Arc::new(TracingSink))
    }
}

fn validate(path: &Path) -> Result<(), ParseError> {
    if path.as_os_str().is_empty() {
        return Err(ParseError::NotFound(PathBuf::new()));
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ParseError::NotAFile(path.to_path_buf())),
        Err(_) => Err(ParseError::NotFound(path.to_path_buf())),
    }
}

fn display_extension(path: &Path) -> String {
    let extension = format::extension_of(path);
    if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
