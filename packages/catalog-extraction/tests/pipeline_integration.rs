//! Integration tests for spreadsheet input, export and the composed pipeline.
//!
//! Exported workbooks are read back with calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use catalog_extraction::{
    open_sheet, read_urls_from_excel, save_results_to_excel,
    testing::{MockExtractor, MockFetcher},
    ExportOutcome, FailurePolicy, Pipeline, PipelineError, Record, RecordingProgress, RunConfig,
    PRODUCT_URL_KEY,
};

/// Helper to read every cell of the first sheet as text.
fn read_back(path: &Path) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let name = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&name).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

/// Helper to write an input workbook with one column per `(header, cells)`.
fn write_input(path: &Path, sheets: Vec<(&str, Vec<(&str, Vec<&str>)>)>) {
    let mut workbook = Workbook::new();
    for (sheet_name, columns) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name).unwrap();
        for (col, (header, cells)) in columns.into_iter().enumerate() {
            let col = col as u16;
            worksheet.write_string(0, col, header).unwrap();
            for (row, cell) in cells.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string(row as u32 + 1, col, *cell).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn record(pairs: &[(&str, &str)], url: &str) -> Record {
    let mut record = Record::from_pairs(pairs.iter().copied());
    record.set_source_url(url);
    record
}

#[test]
fn test_export_pins_columns_to_first_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ProductSpec.xlsx");

    let records = vec![
        record(&[("Name", "A")], "u1"),
        record(&[("Name", "B"), ("Color", "red")], "u2"),
    ];
    let outcome = save_results_to_excel(&records, &path).unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: path.clone(),
            rows: 2,
            columns: 2,
        }
    );
    assert_eq!(
        read_back(&path),
        vec![
            vec!["Name", "Product URL"],
            vec!["A", "u1"],
            vec!["B", "u2"],
        ]
    );
}

#[test]
fn test_export_leaves_missing_values_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    let mut first = record(&[("Name", "A"), ("Form", "Pad")], "u1");
    first.insert("Volume", None);
    let second = record(&[("Name", "B")], "u2");

    save_results_to_excel(&[first, second], &path).unwrap();

    let rows = read_back(&path);
    assert_eq!(rows[0], vec!["Name", "Form", "Product URL", "Volume"]);
    assert_eq!(rows[1], vec!["A", "Pad", "u1", ""]);
    assert_eq!(rows[2], vec!["B", "", "u2", ""]);
}

#[test]
fn test_empty_results_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    let outcome = save_results_to_excel(&[], &path).unwrap();

    assert_eq!(outcome, ExportOutcome::Skipped);
    assert!(!path.exists());
}

#[test]
fn test_read_urls_from_named_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.xlsx");
    write_input(
        &path,
        vec![
            ("Notes", vec![("Text", vec!["ignore me"])]),
            (
                "Sheet1",
                vec![
                    ("SKU", vec!["1", "2", "3", "4"]),
                    ("URLs", vec!["http://a.com", "ftp://b.com", "", "https://c.com"]),
                ],
            ),
        ],
    );

    let partition = read_urls_from_excel(&path, Some("Sheet1"), "URLs").unwrap();
    assert_eq!(partition.valid, vec!["http://a.com", "https://c.com"]);
    assert_eq!(partition.invalid, vec!["ftp://b.com"]);

    let first = open_sheet(&path, None).unwrap();
    assert_eq!(first.name, "Notes");
    assert_eq!(first.columns(), ["Text"]);
}

#[tokio::test]
async fn test_pipeline_end_to_end_with_mocks() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("out.xlsx");
    std::fs::write(
        &input,
        "Links\nhttps://shop.example/1\nnot a url\nhttps://shop.example/2\n",
    )
    .unwrap();

    let fetcher = MockFetcher::new()
        .with_page("https://shop.example/1", "<p>Gauze</p>")
        .with_page("https://shop.example/2", "<p>Tape</p>");
    let extractor = MockExtractor::new()
        .with_record("https://shop.example/1", [("Product name", "Gauze")])
        .with_record("https://shop.example/2", [("Product name", "Tape"), ("Form", "Roll")]);
    let mut progress = RecordingProgress::default();

    let summary = Pipeline::new(fetcher, extractor)
        .with_column("Links")
        .execute(&input, &output, Some(&mut progress))
        .await
        .unwrap();

    assert_eq!(summary.partition.invalid, vec!["not a url"]);
    assert_eq!(progress.updates, vec![(1, 2), (2, 2)]);
    assert!(matches!(summary.export, ExportOutcome::Written { rows: 2, .. }));
    assert_eq!(
        read_back(&output),
        vec![
            vec!["Product name", PRODUCT_URL_KEY],
            vec!["Gauze", "https://shop.example/1"],
            vec!["Tape", "https://shop.example/2"],
        ]
    );
}

#[tokio::test]
async fn test_pipeline_abort_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("out.xlsx");
    std::fs::write(&input, "URLs\nhttps://a.com/1\nhttps://a.com/2\n").unwrap();

    let fetcher = MockFetcher::new()
        .with_page("https://a.com/1", "ok")
        .with_status("https://a.com/2", 503);
    let extractor = MockExtractor::new().with_default_record([("Name", "x")]);

    let err = Pipeline::new(fetcher, extractor)
        .execute(&input, &output, None)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Run(_)));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_pipeline_isolate_exports_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("out.xlsx");
    std::fs::write(&input, "URLs\nhttps://a.com/1\nhttps://a.com/2\n").unwrap();

    let fetcher = MockFetcher::new()
        .with_status("https://a.com/1", 503)
        .with_page("https://a.com/2", "ok");
    let extractor = MockExtractor::new().with_default_record([("Name", "x")]);

    let summary = Pipeline::new(fetcher, extractor)
        .with_run_config(RunConfig::new().with_failure_policy(FailurePolicy::Isolate))
        .execute(&input, &output, None)
        .await
        .unwrap();

    assert_eq!(summary.report.failure_count(), 1);
    assert_eq!(
        read_back(&output),
        vec![vec!["Name", PRODUCT_URL_KEY], vec!["x", "https://a.com/2"]]
    );
}

#[tokio::test]
async fn test_pipeline_missing_column_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    std::fs::write(&input, "Links\nhttps://a.com\n").unwrap();

    let err = Pipeline::new(MockFetcher::new(), MockExtractor::new())
        .execute(&input, &dir.path().join("out.xlsx"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Input(_)));
}
