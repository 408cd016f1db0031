use std::fmt;
use std::path::{Path, PathBuf};

use docparse_config::Backend;
use serde::Serialize;

use crate::format::FormatKind;

/// How much of a document a malformed-content failure invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedScope {
    /// The whole parse attempt is void.
    WholeDocument,
    /// One bounded unit (a page) was skipped; the rest of the document stands.
    Unit,
}

/// Flat failure taxonomy shared by every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    NotAFile,
    UnsupportedFormat,
    BackendUnavailable,
    DecodeError,
    MalformedContent(MalformedScope),
    ResourceExhausted,
    IoFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotFound => f.write_str("not found"),
            FailureKind::NotAFile => f.write_str("not a file"),
            FailureKind::UnsupportedFormat => f.write_str("unsupported format"),
            FailureKind::BackendUnavailable => f.write_str("backend unavailable"),
            FailureKind::DecodeError => f.write_str("decode error"),
            FailureKind::MalformedContent(MalformedScope::WholeDocument) => {
                f.write_str("malformed content")
            }
            FailureKind::MalformedContent(MalformedScope::Unit) => {
                f.write_str("malformed content (unit)")
            }
            FailureKind::ResourceExhausted => f.write_str("resource exhausted"),
            FailureKind::IoFailure => f.write_str("I/O failure"),
        }
    }
}

fn at_line(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

/// Errors raised by a single extraction strategy.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Content is not valid text in the expected encoding.
    #[error("could not decode content{}: {message}", at_line(.line))]
    Decode { line: Option<u64>, message: String },

    /// Content violates the format's syntax.
    #[error("malformed content{}: {message}", at_line(.line))]
    Malformed {
        scope: MalformedScope,
        line: Option<u64>,
        message: String,
    },

    /// A size or memory budget was exceeded.
    #[error("resource limit exceeded: {0}")]
    ResourceExhausted(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whole-document syntax failure without position information.
    pub fn malformed(message: impl Into<String>) -> Self {
        ExtractError::Malformed {
            scope: MalformedScope::WholeDocument,
            line: None,
            message: message.into(),
        }
    }

    /// Whole-document syntax failure at a known line.
    pub fn malformed_at(line: u64, message: impl Into<String>) -> Self {
        ExtractError::Malformed {
            scope: MalformedScope::WholeDocument,
            line: Some(line),
            message: message.into(),
        }
    }

    /// Failure confined to one unit of the document.
    pub fn unit(message: impl Into<String>) -> Self {
        ExtractError::Malformed {
            scope: MalformedScope::Unit,
            line: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::Decode { .. } => FailureKind::DecodeError,
            ExtractError::Malformed { scope, .. } => FailureKind::MalformedContent(*scope),
            ExtractError::ResourceExhausted(_) => FailureKind::ResourceExhausted,
            ExtractError::Io(_) => FailureKind::IoFailure,
        }
    }

    /// Line number of the offending content, when the format has lines.
    pub fn line(&self) -> Option<u64> {
        match self {
            ExtractError::Decode { line, .. } | ExtractError::Malformed { line, .. } => *line,
            _ => None,
        }
    }
}

/// The failure result of a `parse` call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Path does not exist (or is empty).
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a regular file.
    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Extension is not in the supported table.
    #[error("Unsupported file format '{extension}' for file: {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Format is known but its optional backend is missing.
    #[error("{format} parsing requires the {backend} backend, which is not available (file: {})", .path.display())]
    BackendUnavailable {
        path: PathBuf,
        format: FormatKind,
        backend: Backend,
    },

    /// The strategy for `format` failed.
    #[error("Failed to parse {format} file {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        format: FormatKind,
        #[source]
        source: ExtractError,
    },
}

impl ParseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::NotFound(_) => FailureKind::NotFound,
            ParseError::NotAFile(_) => FailureKind::NotAFile,
            ParseError::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            ParseError::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
            ParseError::Extraction { source, .. } => source.kind(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ParseError::NotFound(path) | ParseError::NotAFile(path) => path,
            ParseError::UnsupportedFormat { path, .. }
            | ParseError::BackendUnavailable { path, .. }
            | ParseError::Extraction { path, .. } => path,
        }
    }

    /// Format the failure was raised for, when detection got that far.
    pub fn format(&self) -> Option<FormatKind> {
        match self {
            ParseError::BackendUnavailable { format, .. } | ParseError::Extraction { format, .. } => {
                Some(*format)
            }
            ParseError::UnsupportedFormat { .. } => Some(FormatKind::Unsupported),
            _ => None,
        }
    }
}
