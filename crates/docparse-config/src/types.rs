use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optional extraction backends that may be missing from a build.
///
/// Configuration files may also name a backend by a common alias
/// (`docx`, `xlsx`, `excel`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Backend {
    /// Portable-document (PDF) reader
    Pdf,
    /// Word-processor (DOCX) reader
    Word,
    /// Spreadsheet (XLSX/XLS) reader
    Spreadsheet,
    /// Hypertext DOM reader
    Html,
}

impl Backend {
    /// Every optional backend, in reporting order.
    pub const ALL: [Backend; 4] = [
        Backend::Pdf,
        Backend::Word,
        Backend::Spreadsheet,
        Backend::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Pdf => "pdf",
            Backend::Word => "word",
            Backend::Spreadsheet => "spreadsheet",
            Backend::Html => "html",
        }
    }

    /// Human-readable description used in capability reports.
    pub fn description(&self) -> &'static str {
        match self {
            Backend::Pdf => "portable-document reader",
            Backend::Word => "word-processor reader",
            Backend::Spreadsheet => "spreadsheet reader",
            Backend::Html => "markup/tree reader",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Backend::Pdf),
            "word" | "docx" => Ok(Backend::Word),
            "spreadsheet" | "xlsx" | "excel" => Ok(Backend::Spreadsheet),
            "html" => Ok(Backend::Html),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Top-level parser configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub delimited: DelimitedConfig,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
    #[serde(default)]
    pub word: WordConfig,
}

/// Backend availability overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Backends to treat as unavailable even when compiled in.
    #[serde(default)]
    pub disabled: Vec<Backend>,
}

/// Delimited (CSV) dialect. No sniffing: what is configured is what is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelimitedConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_quote")]
    pub quote: char,
    /// Reject records whose field count differs from the first record.
    #[serde(default)]
    pub strict_field_count: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        DelimitedConfig {
            delimiter: default_delimiter(),
            quote: default_quote(),
            strict_field_count: false,
        }
    }
}

/// Spreadsheet loading limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    /// Upper bound on cells loaded across all sheets of one workbook.
    #[serde(default = "default_max_cells")]
    pub max_cells: u64,
}

fn default_max_cells() -> u64 {
    10_000_000
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        SpreadsheetConfig {
            max_cells: default_max_cells(),
        }
    }
}

/// Word-processor extraction options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordConfig {
    /// Emit table rows as tab-separated lines alongside body paragraphs.
    #[serde(default)]
    pub include_tables: bool,
}
