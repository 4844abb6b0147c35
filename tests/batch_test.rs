//! Integration tests for batch generation.

mod common;

use common::{body_paragraphs, main_document, nth_table, paragraph, table, table_cells, TemplateBuilder};
use docfill::{
    generate_batch, BatchEvent, BatchOptions, CancelToken, Docfill, Record, RecordList, Template,
};

fn invoice_template() -> Template {
    let bytes = TemplateBuilder::new()
        .body(&paragraph(&["Customer {{Name}}"]))
        .body(&table(&[
            &["{{LOOP_Lines_START}}"],
            &["{{Name}}: {{Amount}}"],
            &["{{LOOP_Lines_END}}"],
        ]))
        .build();
    Template::from_bytes(bytes).unwrap()
}

fn people(names: &[&str]) -> RecordList {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| Record::new().with("Name", *n).with("Amount", (i as i64 + 1) * 10))
        .collect()
}

fn file_names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_one_document_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let options = BatchOptions::new()
        .with_fill_count(1)
        .with_name_rule("{{Name}}");

    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", "Bob", "Cy"]),
        dir.path(),
        &options,
    )
    .unwrap();

    assert_eq!(file_names(&report.outputs), vec!["Ada.docx", "Bob.docx", "Cy.docx"]);
    assert_eq!(report.processed_records, 3);
    assert!(report.failures.is_empty());

    let bob = main_document(&std::fs::read(&report.outputs[1]).unwrap());
    assert_eq!(body_paragraphs(&bob), vec!["Customer Bob"]);
    assert_eq!(table_cells(nth_table(&bob, 0)), vec![vec!["Bob: 20"]]);
}

#[test]
fn test_chunks_fill_loops() {
    let dir = tempfile::tempdir().unwrap();
    let options = BatchOptions::new().with_fill_count(2).sequential();

    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", "Bob", "Cy"]),
        dir.path(),
        &options,
    )
    .unwrap();

    assert_eq!(report.outputs.len(), 2);
    let first = main_document(&std::fs::read(&report.outputs[0]).unwrap());
    assert_eq!(body_paragraphs(&first), vec!["Customer Ada"]);
    assert_eq!(
        table_cells(nth_table(&first, 0)),
        vec![vec!["Ada: 10"], vec!["Bob: 20"]]
    );

    let second = main_document(&std::fs::read(&report.outputs[1]).unwrap());
    assert_eq!(table_cells(nth_table(&second, 0)), vec![vec!["Cy: 30"]]);
}

#[test]
fn test_fill_count_zero_is_one_document() {
    let dir = tempfile::tempdir().unwrap();
    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", "Bob", "Cy"]),
        dir.path(),
        &BatchOptions::new().with_document_type("Invoice"),
    )
    .unwrap();

    assert_eq!(report.outputs.len(), 1);
    let name = file_names(&report.outputs).remove(0);
    assert!(name.starts_with("Invoice_"));
    assert!(name.ends_with("_3_1.docx"));
}

#[test]
fn test_duplicate_names_get_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let options = BatchOptions::new()
        .with_fill_count(1)
        .with_name_rule("{Name}");

    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", "Ada"]),
        dir.path(),
        &options,
    )
    .unwrap();

    assert_eq!(file_names(&report.outputs), vec!["Ada.docx", "Ada_1.docx"]);
}

#[test]
fn test_failed_output_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let too_long = "x".repeat(300);
    let options = BatchOptions::new()
        .with_fill_count(1)
        .with_name_rule("{{Name}}")
        .sequential();

    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", too_long.as_str(), "Cy"]),
        dir.path(),
        &options,
    )
    .unwrap();

    assert_eq!(file_names(&report.outputs), vec!["Ada.docx", "Cy.docx"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(!report.is_failed());
}

#[test]
fn test_cancelled_batch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let token = CancelToken::new();
    token.cancel();
    let options = BatchOptions::new().with_fill_count(1).with_cancel(token);

    let report = generate_batch(
        &invoice_template(),
        &people(&["Ada", "Bob"]),
        dir.path(),
        &options,
    )
    .unwrap();

    assert!(report.outputs.is_empty());
    assert_eq!(report.skipped, 2);
    assert!(!report.is_failed());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_progress_events() {
    let dir = tempfile::tempdir().unwrap();
    let (sender, receiver) = crossbeam_channel::unbounded();
    let options = BatchOptions::new()
        .with_fill_count(1)
        .sequential()
        .with_progress(sender);

    generate_batch(
        &invoice_template(),
        &people(&["Ada", "Bob"]),
        dir.path(),
        &options,
    )
    .unwrap();
    drop(options);

    let events: Vec<BatchEvent> = receiver.iter().collect();
    assert_eq!(events.first(), Some(&BatchEvent::Started { total: 2 }));
    assert_eq!(
        events.last(),
        Some(&BatchEvent::Finished {
            written: 2,
            failed: 0
        })
    );
    let written = events
        .iter()
        .filter(|e| matches!(e, BatchEvent::Written { .. }))
        .count();
    assert_eq!(written, 2);
}

#[test]
fn test_builder_batch_applies_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = TemplateBuilder::new()
        .settings("")
        .body(&paragraph(&["{{Name}}"]))
        .build();

    let report = Docfill::new()
        .read_only()
        .load_bytes(&bytes)
        .unwrap()
        .batch(
            &people(&["Ada"]),
            dir.path(),
            BatchOptions::new().with_name_rule("{{Name}}"),
        )
        .unwrap();

    let path = &report.outputs[0];
    assert!(std::fs::metadata(path).unwrap().permissions().readonly());
    let settings = common::part_xml(&std::fs::read(path).unwrap(), "word/settings.xml");
    assert!(settings.contains("w:documentProtection"));
}
