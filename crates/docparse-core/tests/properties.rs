//! Property tests over `Dispatcher::parse`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use docparse_core::strategies::{PageSource, PdfReader, PortableDocStrategy};
use docparse_core::{
    Backend, CapabilityRegistry, Dispatcher, ExtractError, FailureKind, FormatKind, Level,
    MemorySink, ParsedDocument, ParserConfig, StructuredValue,
};
use proptest::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn dispatcher(registry: CapabilityRegistry) -> (Dispatcher, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let dispatcher =
        Dispatcher::with_registry(&ParserConfig::default(), registry, sink.clone()).unwrap();
    (dispatcher, sink)
}

fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _\\-\"\\\\]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|entries| {
                Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

struct ScriptedPages {
    count: usize,
    failing: usize,
}

impl PageSource for ScriptedPages {
    fn page_count(&self) -> usize {
        self.count
    }

    fn page_text(&self, index: usize) -> Result<String, String> {
        if index == self.failing {
            Err("corrupt content stream".to_string())
        } else {
            Ok(format!("text of page {}", index + 1))
        }
    }
}

struct ScriptedReader {
    count: usize,
    failing: usize,
}

impl PdfReader for ScriptedReader {
    fn open(&self, _path: &Path) -> Result<Box<dyn PageSource>, ExtractError> {
        Ok(Box::new(ScriptedPages {
            count: self.count,
            failing: self.failing,
        }))
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_ascii_text_round_trips(content in "[ -~\t\r\n]{0,400}") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.txt");
        fs::write(&path, &content).unwrap();

        let (dispatcher, sink) = dispatcher(CapabilityRegistry::detect());
        let doc = dispatcher.parse(&path).unwrap();
        prop_assert_eq!(doc, ParsedDocument::Text(content));
        prop_assert_eq!(sink.count(Level::Warning), 0);
    }

    #[test]
    fn prop_delimited_rows_match_records(
        rows in (1usize..5).prop_flat_map(|width| {
            prop::collection::vec(
                prop::collection::vec("[a-zA-Z0-9 ,\"]{0,10}", width),
                1..30,
            )
        })
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");
        let content: String = rows
            .iter()
            .map(|row| {
                let fields: Vec<String> = row.iter().map(|f| quote_field(f)).collect();
                format!("{}\n", fields.join(","))
            })
            .collect();
        fs::write(&path, content).unwrap();

        let (dispatcher, _) = dispatcher(CapabilityRegistry::detect());
        let doc = dispatcher.parse(&path).unwrap();
        let table = doc.as_table().unwrap();

        prop_assert_eq!(table.len(), rows.len());
        prop_assert!(table.is_rectangular());
        prop_assert_eq!(&table.rows, &rows);
    }

    #[test]
    fn prop_structured_value_round_trips(value in json_value()) {
        let dir = TempDir::new().unwrap();
        let first_path = dir.path().join("first.json");
        fs::write(&first_path, serde_json::to_string(&value).unwrap()).unwrap();

        let (dispatcher, _) = dispatcher(CapabilityRegistry::detect());
        let first = dispatcher.parse(&first_path).unwrap();
        let parsed = first.as_structured().unwrap();
        prop_assert_eq!(parsed, &StructuredValue::from(value));

        let second_path = dir.path().join("second.json");
        fs::write(&second_path, parsed.to_json_string().unwrap()).unwrap();
        let second = dispatcher.parse(&second_path).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_unknown_extension_is_unsupported(
        extension in "[a-z]{1,5}",
        content in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(FormatKind::from_extension(&extension) == FormatKind::Unsupported);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("file.{}", extension));
        fs::write(&path, &content).unwrap();

        let (dispatcher, _) = dispatcher(CapabilityRegistry::detect());
        let err = dispatcher.parse(&path).unwrap_err();
        prop_assert_eq!(err.kind(), FailureKind::UnsupportedFormat);
    }

    #[test]
    fn prop_one_failing_page_one_warning(
        (count, failing) in (1usize..16).prop_flat_map(|n| (Just(n), 0..n))
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paged.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let (mut dispatcher, sink) =
            dispatcher(CapabilityRegistry::with_availability([(Backend::Pdf, true)]));
        dispatcher.register(Box::new(PortableDocStrategy::new(Box::new(ScriptedReader {
            count,
            failing,
        }))));

        let doc = dispatcher.parse(&path).unwrap();
        let expected: Vec<String> = (0..count)
            .filter(|i| *i != failing)
            .map(|i| format!("text of page {}", i + 1))
            .collect();

        let expected_text = expected.join("\n");
        prop_assert_eq!(doc.as_text(), Some(expected_text.as_str()));
        prop_assert_eq!(sink.count(Level::Warning), 1);
        prop_assert_eq!(sink.count(Level::Error), 0);
    }

    #[test]
    fn prop_unavailable_backend_never_crashes(
        name in prop::sample::select(vec!["a.pdf", "b.docx", "c.xlsx", "d.xls", "e.html", "f.htm"]),
        content in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, &content).unwrap();

        let (dispatcher, _) = dispatcher(CapabilityRegistry::with_availability([]));
        let err = dispatcher.parse(&path).unwrap_err();
        prop_assert_eq!(err.kind(), FailureKind::BackendUnavailable);
    }
}
