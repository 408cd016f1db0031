use std::path::Path;

use scraper::{ElementRef, Html, Selector};

use super::{read_utf8, Extraction, ExtractionStrategy};
use crate::document::ParsedDocument;
use crate::error::ExtractError;
use crate::format::FormatKind;

/// Elements that start and end a line of visible text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Hypertext: visible text, one line per block, scripts and styles removed.
pub struct HyperTextStrategy;

impl HyperTextStrategy {
    pub fn new() -> Self {
        HyperTextStrategy
    }
}

impl Default for HyperTextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for HyperTextStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::HyperText
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let content = read_utf8(path)?;
        let text = visible_text(&content)?;
        Ok(Extraction::new(ParsedDocument::Text(text)))
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

fn visible_text(html: &str) -> Result<String, ExtractError> {
    let mut document = Html::parse_document(html);

    let hidden = Selector::parse("script, style")
        .map_err(|e| ExtractError::malformed(format!("invalid selector: {:?}", e)))?;
    let hidden_ids: Vec<_> = document.select(&hidden).map(|element| element.id()).collect();
    for id in hidden_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let mut lines = LineBuilder::default();
    collect_text(document.root_element(), &mut lines);
    Ok(lines.finish())
}

fn collect_text(element: ElementRef<'_>, lines: &mut LineBuilder) {
    let name = element.value().name();
    if name == "br" {
        lines.break_line();
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        lines.break_line();
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, lines);
        } else if let Some(text) = child.value().as_text() {
            lines.push_text(text);
        }
    }

    if block {
        lines.break_line();
    }
}

/// Accumulates text with collapsed whitespace, one trimmed line per block.
#[derive(Default)]
struct LineBuilder {
    current: String,
    lines: Vec<String>,
}

impl LineBuilder {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(ch);
            }
        }
    }

    fn break_line(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}
