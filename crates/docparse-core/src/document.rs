use indexmap::IndexMap;
use serde::Serialize;

/// Ordered rows of string fields. Row 0 is conventionally the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// True when every row has as many fields as the first.
    pub fn is_rectangular(&self) -> bool {
        match self.rows.first() {
            Some(first) => self.rows.iter().all(|row| row.len() == first.len()),
            None => true,
        }
    }
}

/// Recursive value mirroring a structured-data document.
///
/// Mappings keep the key order of the source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<StructuredValue>),
    Map(IndexMap<String, StructuredValue>),
}

impl StructuredValue {
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        match self {
            StructuredValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StructuredValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StructuredValue]> {
        match self {
            StructuredValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StructuredValue::Null)
    }

    /// Serialize back to compact JSON text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => StructuredValue::Null,
            serde_json::Value::Bool(b) => StructuredValue::Bool(b),
            serde_json::Value::Number(n) => StructuredValue::Number(n),
            serde_json::Value::String(s) => StructuredValue::String(s),
            serde_json::Value::Array(items) => {
                StructuredValue::List(items.into_iter().map(StructuredValue::from).collect())
            }
            serde_json::Value::Object(map) => StructuredValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, StructuredValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Normalized result of a successful parse. Exactly one shape per document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ParsedDocument {
    Text(String),
    Table(Table),
    StructuredValue(StructuredValue),
    SheetSet(IndexMap<String, Table>),
}

impl ParsedDocument {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParsedDocument::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ParsedDocument::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredValue> {
        match self {
            ParsedDocument::StructuredValue(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sheets(&self) -> Option<&IndexMap<String, Table>> {
        match self {
            ParsedDocument::SheetSet(sheets) => Some(sheets),
            _ => None,
        }
    }

    /// Name of the populated variant.
    pub fn shape(&self) -> &'static str {
        match self {
            ParsedDocument::Text(_) => "text",
            ParsedDocument::Table(_) => "table",
            ParsedDocument::StructuredValue(_) => "structured_value",
            ParsedDocument::SheetSet(_) => "sheet_set",
        }
    }

    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        match self {
            ParsedDocument::Text(text) => format!("text, {} characters", text.chars().count()),
            ParsedDocument::Table(table) => format!("table, {} rows", table.len()),
            ParsedDocument::StructuredValue(value) => match value {
                StructuredValue::Map(map) => format!("structured value, mapping of {} keys", map.len()),
                StructuredValue::List(items) => format!("structured value, list of {} items", items.len()),
                _ => "structured value, scalar".to_string(),
            },
            ParsedDocument::SheetSet(sheets) => format!("sheet set, {} sheets", sheets.len()),
        }
    }
}
