use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{Extraction, ExtractionStrategy};
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

const MAIN_PART: &str = "word/document.xml";

/// DOCX: non-empty paragraphs in document order, one per line.
pub struct WordDocStrategy {
    include_tables: bool,
}

impl WordDocStrategy {
    pub fn new(include_tables: bool) -> Self {
        WordDocStrategy { include_tables }
    }
}

impl Default for WordDocStrategy {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ExtractionStrategy for WordDocStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::WordDoc
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(container_error)?;

        let mut xml = String::new();
        archive
            .by_name(MAIN_PART)
            .map_err(container_error)?
            .read_to_string(&mut xml)
            .map_err(|e| ExtractError::malformed(format!("cannot read {}: {}", MAIN_PART, e)))?;

        let lines = document_lines(&xml, self.include_tables)?;
        Ok(Extraction::new(ParsedDocument::Text(lines.join("\n"))))
    }

    fn name(&self) -> &'static str {
        "docx"
    }
}

fn container_error(err: ZipError) -> ExtractError {
    match err {
        ZipError::Io(e) => ExtractError::Io(e),
        ZipError::FileNotFound => {
            ExtractError::malformed(format!("not a Word document: missing {}", MAIN_PART))
        }
        other => ExtractError::malformed(format!("corrupted DOCX container: {}", other)),
    }
}

/// Body paragraphs (and, optionally, table rows) of `word/document.xml`.
///
/// Paragraph text is the concatenation of its `w:t` runs, with `w:tab` as
/// `\t` and `w:br`/`w:cr` as `\n`. Paragraphs inside tables are only emitted
/// as part of a tab-separated row when `include_tables` is set.
fn document_lines(xml: &str, include_tables: bool) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut lines = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut in_run = false;
    let mut table_depth: usize = 0;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut cells: Vec<Vec<String>> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::malformed(format!("invalid {}: {}", MAIN_PART, e)))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"r" => in_run = true,
                b"t" => in_text = true,
                b"tbl" => table_depth += 1,
                b"tr" => rows.push(Vec::new()),
                b"tc" => cells.push(Vec::new()),
                _ => {}
            },
            Event::Empty(e) if in_run => {
                if let Some(paragraph) = paragraphs.last_mut() {
                    match e.local_name().as_ref() {
                        b"tab" => paragraph.push('\t'),
                        b"br" | b"cr" => paragraph.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(text) if in_text => {
                if let Some(paragraph) = paragraphs.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| ExtractError::malformed(e.to_string()))?;
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => {
                    let paragraph = paragraphs.pop().unwrap_or_default();
                    if paragraph.is_empty() {
                        continue;
                    }
                    if table_depth == 0 {
                        lines.push(paragraph);
                    } else if let Some(cell) = cells.last_mut() {
                        cell.push(paragraph);
                    }
                }
                b"tc" => {
                    let cell = cells.pop().unwrap_or_default();
                    if let Some(row) = rows.last_mut() {
                        row.push(cell.join(" "));
                    }
                }
                b"tr" => {
                    let row = rows.pop().unwrap_or_default();
                    if include_tables && row.iter().any(|cell| !cell.is_empty()) {
                        lines.push(row.join("\t"));
                    }
                }
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, MalformedScope};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn write_docx(dir: &TempDir, document_xml: &str) -> std::path::PathBuf {
        let path = dir.path().join("sample.docx");
        let file = File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(MAIN_PART, SimpleFileOptions::default()).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_paragraphs_in_order_skipping_empty() {
        let xml = body(&format!(
            "{}<w:p/>{}<w:p><w:r><w:t></w:t></w:r></w:p>{}",
            paragraph("First"),
            paragraph("Second"),
            paragraph("Third")
        ));
        assert_eq!(
            document_lines(&xml, false).unwrap(),
            vec!["First", "Second", "Third"]
        );
    }

    #[test]
    fn test_runs_tabs_breaks_and_entities() {
        let xml = body(
            r#"<w:p><w:r><w:t xml:space="preserve">Name: </w:t></w:r><w:r><w:tab/><w:t>A &amp; B</w:t><w:br/><w:t>next</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            document_lines(&xml, false).unwrap(),
            vec!["Name: \tA & B\nnext"]
        );
    }

    #[test]
    fn test_tab_stops_in_paragraph_properties_ignored() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Text</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_lines(&xml, false).unwrap(), vec!["Text"]);
    }

    #[test]
    fn test_tables_skipped_by_default() {
        let table = format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("cell 1"),
            paragraph("cell 2")
        );
        let xml = body(&format!("{}{}{}", paragraph("Before"), table, paragraph("After")));

        assert_eq!(document_lines(&xml, false).unwrap(), vec!["Before", "After"]);
        assert_eq!(
            document_lines(&xml, true).unwrap(),
            vec!["Before", "cell 1\tcell 2", "After"]
        );
    }

    #[test]
    fn test_extract_from_container() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &body(&format!("{}{}", paragraph("Hello"), paragraph("World"))));

        let extraction = WordDocStrategy::default().extract(&path).unwrap();
        assert_eq!(extraction.document.as_text(), Some("Hello\nWorld"));
    }

    #[test]
    fn test_corrupted_container_is_whole_document_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();

        let err = WordDocStrategy::default().extract(&path).unwrap_err();
        assert_eq!(
            err.kind(),
            FailureKind::MalformedContent(MalformedScope::WholeDocument)
        );
    }

    #[test]
    fn test_zip_without_main_part_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.docx");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();

        let err = WordDocStrategy::default().extract(&path).unwrap_err();
        assert!(err.to_string().contains(MAIN_PART));
    }
}
