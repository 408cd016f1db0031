use std::fs::File;
use std::path::Path;

use docparse_config::DelimitedConfig;

use super::{Extraction, ExtractionStrategy};
use crate::document::{ParsedDocument, Table};
use crate::error::ExtractError;
use crate::format::FormatKind;

/// Delimited records in a fixed, configured dialect. No sniffing, no type
/// inference.
pub struct DelimitedStrategy {
    config: DelimitedConfig,
}

impl DelimitedStrategy {
    /// `config` must have passed `ParserConfig::validate`, so both
    /// characters are single ASCII bytes.
    pub fn new(config: DelimitedConfig) -> Self {
        DelimitedStrategy { config }
    }

    fn reader(&self, file: File) -> csv::Reader<File> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.config.delimiter as u8)
            .quote(self.config.quote as u8)
            .flexible(!self.config.strict_field_count)
            .from_reader(file)
    }
}

impl Default for DelimitedStrategy {
    fn default() -> Self {
        Self::new(DelimitedConfig::default())
    }
}

impl ExtractionStrategy for DelimitedStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::Delimited
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let file = File::open(path)?;
        let mut reader = self.reader(file);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Extraction::new(ParsedDocument::Table(Table::new(rows))))
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

/// A bad record fails the whole document, pinned to its line.
fn csv_error(err: csv::Error) -> ExtractError {
    let line = err.position().map(|pos| pos.line());

    match err.into_kind() {
        csv::ErrorKind::Io(e) => ExtractError::Io(e),
        csv::ErrorKind::Utf8 { err, .. } => ExtractError::Decode {
            line,
            message: err.to_string(),
        },
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => malformed(
            line,
            format!(
                "found record with {} fields, but the previous record has {} fields",
                len, expected_len
            ),
        ),
        other => malformed(line, format!("{:?}", other)),
    }
}

fn malformed(line: Option<u64>, message: String) -> ExtractError {
    match line {
        Some(line) => ExtractError::malformed_at(line, message),
        None => ExtractError::malformed(message),
    }
}
