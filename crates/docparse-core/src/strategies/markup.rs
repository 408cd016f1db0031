use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{line_at, read_utf8, Extraction, ExtractionStrategy};
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

/// XML: text of every node, trimmed, joined with single spaces.
pub struct MarkupTextStrategy;

impl MarkupTextStrategy {
    pub fn new() -> Self {
        MarkupTextStrategy
    }
}

impl Default for MarkupTextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for MarkupTextStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::Markup
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let content = read_utf8(path)?;
        let fragments = text_fragments(&content)?;
        Ok(Extraction::new(ParsedDocument::Text(fragments.join(" "))))
    }

    fn name(&self) -> &'static str {
        "xml"
    }
}

/// Walk the document and collect each element's leading text (the text
/// before its first child element), trimmed, in document order. Text that
/// follows a child element is not part of any element's leading text and is
/// dropped. A single well-formed root element is required.
fn text_fragments(content: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(content);
    let at = |pos: u64| line_at(content.as_bytes(), pos as usize);

    let mut fragments = Vec::new();
    // One entry per open element; `None` once its first child has opened.
    let mut open: Vec<Option<String>> = Vec::new();
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::malformed_at(at(reader.error_position() as u64), e.to_string()))?;

        match event {
            Event::Start(_) | Event::Empty(_) => {
                if open.is_empty() && seen_root {
                    return Err(ExtractError::malformed_at(
                        at(position),
                        "junk after document element",
                    ));
                }
                seen_root = true;
                if let Some(parent) = open.last_mut() {
                    if let Some(leading) = parent.take() {
                        push_fragment(&mut fragments, &leading);
                    }
                }
                if matches!(event, Event::Start(_)) {
                    open.push(Some(String::new()));
                }
            }
            Event::End(_) => {
                let element = open.pop().ok_or_else(|| {
                    ExtractError::malformed_at(at(position), "closing tag without an open element")
                })?;
                if let Some(leading) = element {
                    push_fragment(&mut fragments, &leading);
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| ExtractError::malformed_at(at(position), e.to_string()))?;
                collect_text(&mut open, &text, at(position))?;
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| ExtractError::malformed_at(at(position), e.to_string()))?;
                collect_text(&mut open, text, at(position))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if !seen_root {
        return Err(ExtractError::malformed("no element found"));
    }
    if !open.is_empty() {
        return Err(ExtractError::malformed_at(
            at(content.len() as u64),
            format!("{} unclosed element(s) at end of document", open.len()),
        ));
    }

    Ok(fragments)
}

fn collect_text(open: &mut [Option<String>], text: &str, line: u64) -> Result<(), ExtractError> {
    match open.last_mut() {
        Some(Some(leading)) => leading.push_str(text),
        Some(None) => {}
        None if text.trim().is_empty() => {}
        None => {
            return Err(ExtractError::malformed_at(line, "text outside the document element"))
        }
    }
    Ok(())
}

fn push_fragment(fragments: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}
