use std::path::{Path, PathBuf};

use docparse_core::{Dispatcher, ParseError, ParsedDocument, Table};
use serde_json::json;

pub fn run(
    dispatcher: &Dispatcher,
    paths: &[PathBuf],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failed = 0;

    for path in paths {
        let result = dispatcher.parse(path);
        if result.is_err() {
            failed += 1;
        }

        if json {
            print_json(path, &result)?;
        } else {
            print_plain(path, &result)?;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} file(s) failed to parse", failed, paths.len()).into());
    }

    Ok(())
}

fn print_json(
    path: &Path,
    result: &Result<ParsedDocument, ParseError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let line = match result {
        Ok(document) => json!({
            "path": path.display().to_string(),
            "document": document,
        }),
        Err(err) => json!({
            "path": path.display().to_string(),
            "error": {
                "kind": err.kind().to_string(),
                "message": err.to_string(),
            },
        }),
    };
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

fn print_plain(
    path: &Path,
    result: &Result<ParsedDocument, ParseError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(document) => {
            println!("==> {} ({}) <==", path.display(), document.summary());
            match document {
                ParsedDocument::Text(text) => println!("{}", text),
                ParsedDocument::Table(table) => print_table(table),
                ParsedDocument::StructuredValue(value) => {
                    println!("{}", serde_json::to_string_pretty(value)?)
                }
                ParsedDocument::SheetSet(sheets) => {
                    for (name, table) in sheets {
                        println!("[{}]", name);
                        print_table(table);
                    }
                }
            }
        }
        Err(err) => eprintln!("{}: {} ({})", path.display(), err, err.kind()),
    }
    Ok(())
}

fn print_table(table: &Table) {
    for row in &table.rows {
        println!("{}", row.join("\t"));
    }
}
