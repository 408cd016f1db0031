use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use indexmap::IndexMap;

use super::{Extraction, ExtractionStrategy};
use crate::document::{ParsedDocument, Table};
use crate::error::ExtractError;
use crate::format::{extension_of, FormatKind};

/// Workbooks: every sheet loaded eagerly, every cell as a string.
pub struct SpreadsheetStrategy {
    max_cells: u64,
}

impl SpreadsheetStrategy {
    pub fn new(max_cells: u64) -> Self {
        SpreadsheetStrategy { max_cells }
    }
}

impl ExtractionStrategy for SpreadsheetStrategy {
    fn format(&self) -> FormatKind {
        FormatKind::Spreadsheet
    }

    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let file = BufReader::new(File::open(path)?);

        // Engine by extension: legacy BIFF for .xls, OOXML otherwise.
        let sheets = if extension_of(path) == "xls" {
            let workbook: Xls<_> = Xls::new(file).map_err(open_error)?;
            load_sheets(workbook, self.max_cells)?
        } else {
            let workbook: Xlsx<_> = Xlsx::new(file).map_err(open_error)?;
            load_sheets(workbook, self.max_cells)?
        };

        Ok(Extraction::new(ParsedDocument::SheetSet(sheets)))
    }

    fn name(&self) -> &'static str {
        "spreadsheet"
    }
}

fn open_error(err: impl Display) -> ExtractError {
    ExtractError::malformed(format!("cannot open workbook: {}", err))
}

/// Load every worksheet, checking the cell budget before any cell is copied.
fn load_sheets<RS, R>(mut workbook: R, max_cells: u64) -> Result<IndexMap<String, Table>, ExtractError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let mut ranges: Vec<(String, Range<Data>)> = Vec::new();
    let mut total_cells: u64 = 0;

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            ExtractError::malformed(format!("cannot read sheet '{}': {}", name, e))
        })?;

        let (height, width) = range.get_size();
        total_cells = total_cells.saturating_add((height as u64).saturating_mul(width as u64));
        if total_cells > max_cells {
            return Err(ExtractError::ResourceExhausted(format!(
                "workbook exceeds the {} cell limit (reached {} cells at sheet '{}')",
                max_cells, total_cells, name
            )));
        }

        ranges.push((name, range));
    }

    Ok(ranges
        .into_iter()
        .map(|(name, range)| (name, range_to_table(&range)))
        .collect())
}

fn range_to_table(range: &Range<Data>) -> Table {
    Table::new(
        range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect(),
    )
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, MalformedScope};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="Budget" sheetId="1" r:id="rId1"/>
<sheet name="Notes" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Item</t></is></c><c r="B1" t="inlineStr"><is><t>Cost</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Paper</t></is></c><c r="B2"><v>10</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>Ink</t></is></c><c r="B3"><v>2.5</v></c></row>
</sheetData>
</worksheet>"#;

    const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>reviewed</t></is></c><c r="B1" t="b"><v>1</v></c></row>
</sheetData>
</worksheet>"#;

    fn write_xlsx(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("budget.xlsx");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for (name, content) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ] {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_loads_every_sheet_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(&dir);

        let extraction = SpreadsheetStrategy::new(1_000).extract(&path).unwrap();
        let sheets = extraction.document.as_sheets().unwrap();

        let names: Vec<_> = sheets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Budget", "Notes"]);

        let budget = &sheets["Budget"];
        assert_eq!(budget.len(), 3);
        assert_eq!(budget.rows[0], vec!["Item", "Cost"]);
        assert_eq!(budget.rows[1], vec!["Paper", "10"]);
        assert_eq!(budget.rows[2], vec!["Ink", "2.5"]);

        assert_eq!(sheets["Notes"].rows[0], vec!["reviewed", "true"]);
    }

    #[test]
    fn test_loads_legacy_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/budget.xls");

        let extraction = SpreadsheetStrategy::new(1_000).extract(&path).unwrap();
        let sheets = extraction.document.as_sheets().unwrap();

        let names: Vec<_> = sheets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Budget", "Notes"]);

        let budget = &sheets["Budget"];
        assert_eq!(budget.len(), 3);
        assert_eq!(budget.rows[0], vec!["Item", "Cost"]);
        assert_eq!(budget.rows[1], vec!["Paper", "10"]);
        assert_eq!(budget.rows[2], vec!["Ink", "2.5"]);

        assert_eq!(sheets["Notes"].rows[0], vec!["reviewed", "true"]);
    }

    #[test]
    fn test_cell_budget_is_resource_exhausted() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(&dir);

        // Budget holds 6 cells, Notes 2.
        let err = SpreadsheetStrategy::new(7).extract(&path).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ResourceExhausted);
        assert!(err.to_string().contains("Notes"));

        assert!(SpreadsheetStrategy::new(8).extract(&path).is_ok());
    }

    #[test]
    fn test_corrupted_workbook_is_whole_document_failure() {
        let dir = TempDir::new().unwrap();
        for name in ["broken.xlsx", "broken.xls"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"not a workbook at all").unwrap();

            let err = SpreadsheetStrategy::new(1_000).extract(&path).unwrap_err();
            assert_eq!(
                err.kind(),
                FailureKind::MalformedContent(MalformedScope::WholeDocument),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("x".into())), "x");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Bool(false)), "false");
    }
}
