use std::fmt;
use std::path::Path;

use docparse_config::Backend;
use serde::Serialize;

/// Document categories recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Text,
    Delimited,
    StructuredData,
    Markup,
    PortableDoc,
    WordDoc,
    Spreadsheet,
    HyperText,
    Unsupported,
}

/// Supported extensions. Adding a format means adding a row here, a
/// `FormatKind`, and a strategy.
const EXTENSION_TABLE: &[(&str, FormatKind)] = &[
    ("txt", FormatKind::Text),
    ("csv", FormatKind::Delimited),
    ("json", FormatKind::StructuredData),
    ("xml", FormatKind::Markup),
    ("pdf", FormatKind::PortableDoc),
    ("docx", FormatKind::WordDoc),
    ("xlsx", FormatKind::Spreadsheet),
    ("xls", FormatKind::Spreadsheet),
    ("html", FormatKind::HyperText),
    ("htm", FormatKind::HyperText),
];

impl FormatKind {
    /// Every kind that has a strategy.
    pub const SUPPORTED: [FormatKind; 8] = [
        FormatKind::Text,
        FormatKind::Delimited,
        FormatKind::StructuredData,
        FormatKind::Markup,
        FormatKind::PortableDoc,
        FormatKind::WordDoc,
        FormatKind::Spreadsheet,
        FormatKind::HyperText,
    ];

    /// Look up a bare extension (without the dot), case-insensitively.
    pub fn from_extension(extension: &str) -> FormatKind {
        let extension = extension.to_lowercase();
        EXTENSION_TABLE
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, kind)| *kind)
            .unwrap_or(FormatKind::Unsupported)
    }

    /// Optional backend this format's strategy depends on.
    pub fn required_backend(&self) -> Option<Backend> {
        match self {
            FormatKind::PortableDoc => Some(Backend::Pdf),
            FormatKind::WordDoc => Some(Backend::Word),
            FormatKind::Spreadsheet => Some(Backend::Spreadsheet),
            FormatKind::HyperText => Some(Backend::Html),
            FormatKind::Text
            | FormatKind::Delimited
            | FormatKind::StructuredData
            | FormatKind::Markup
            | FormatKind::Unsupported => None,
        }
    }

    /// Extensions that map to this kind.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> + '_ {
        EXTENSION_TABLE
            .iter()
            .filter(move |(_, kind)| kind == self)
            .map(|(ext, _)| *ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Text => "text",
            FormatKind::Delimited => "delimited",
            FormatKind::StructuredData => "structured-data",
            FormatKind::Markup => "markup",
            FormatKind::PortableDoc => "portable-document",
            FormatKind::WordDoc => "word-document",
            FormatKind::Spreadsheet => "spreadsheet",
            FormatKind::HyperText => "hypertext",
            FormatKind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased extension of `path`, or an empty string if it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Map a path to its format by extension alone. Never fails.
pub fn detect(path: &Path) -> FormatKind {
    let extension = extension_of(path);
    if extension.is_empty() {
        return FormatKind::Unsupported;
    }
    FormatKind::from_extension(&extension)
}
