//! Integration tests for the async file API.

#![cfg(feature = "async")]

mod common;

use common::{body_paragraphs, main_document, paragraph, TemplateBuilder};
use docfill::{generate_file_async, DataContext, Error, GenerateOptions, Record};

#[tokio::test]
async fn test_generate_file_async() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.docx");
    tokio::fs::write(
        &template_path,
        TemplateBuilder::new()
            .body(&paragraph(&["Hello {{Name}}"]))
            .build(),
    )
    .await
    .unwrap();
    let output_path = dir.path().join("nested").join("out.docx");
    let data = DataContext::Single(Record::new().with("Name", "Ada"));

    let stats = generate_file_async(&template_path, data, &output_path, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.placeholders_replaced, 1);
    let bytes = tokio::fs::read(&output_path).await.unwrap();
    assert_eq!(body_paragraphs(&main_document(&bytes)), vec!["Hello Ada"]);
}

#[tokio::test]
async fn test_generate_file_async_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let result = generate_file_async(
        dir.path().join("missing.docx"),
        DataContext::Single(Record::new()),
        dir.path().join("out.docx"),
        GenerateOptions::default(),
    )
    .await;

    assert!(matches!(result, Err(Error::TemplateUnavailable { .. })));
}
