use doctopic_core::config::AppConfig;
use doctopic_core::error::{DoctopicError, ErrorCode};
use doctopic_core::ingest::IngestionRequest;
use doctopic_sdk::{AnalysisError, AnalysisResponse, DocumentAnalyzer, UploadedFile};
use serde_json::json;
use slm::{ScriptedJudge, StaticJudge};
use std::collections::HashMap;
use std::sync::Arc;

const REVENUE: &str = r#"{"topics": [{"name": "Revenue", "value": 100, "citation": "Revenue grew 20% YoY", "pages": "Page 1, Lines 1-3"}]}"#;

fn analyzer() -> DocumentAnalyzer {
    DocumentAnalyzer::new(&AppConfig::default(), Arc::new(StaticJudge::new(REVENUE)))
}

#[tokio::test]
async fn test_no_files_envelope() {
    let response = analyzer().respond_to_uploads(vec![]).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": [], "error": "No files uploaded."})
    );
}

#[tokio::test]
async fn test_non_pdf_uploads_are_rejected() {
    let files = vec![
        UploadedFile::new("notes.txt", "text/plain", b"Revenue grew.".to_vec()),
        UploadedFile::new("deck.pdf", "application/octet-stream", b"%PDF".to_vec()),
    ];

    let err = analyzer().analyze_uploads(files).await.unwrap_err();
    assert_eq!(err.to_string(), "No valid PDF files uploaded.");
    assert_eq!(err.error_code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_unreadable_pdf_reports_ingestion_error() {
    let files = vec![UploadedFile::new(
        "broken.pdf",
        "application/pdf",
        b"this is not a pdf".to_vec(),
    )];

    let response = analyzer().respond_to_uploads(files).await;
    assert!(response.is_error());
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn test_text_request_produces_records() {
    let records = analyzer()
        .analyze_requests(vec![IngestionRequest::text(
            "Revenue grew 20% YoY.",
            HashMap::new(),
        )])
        .await
        .unwrap();

    let response = AnalysisResponse::from_result(Ok(records));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": [{
            "id": "1",
            "parent": "",
            "name": "Revenue",
            "value": 100,
            "citation": "Revenue grew 20% YoY",
            "pages": "Page 1, Lines 1-3"
        }]})
    );
}

#[tokio::test]
async fn test_merge_failure_surfaces_as_error() {
    // One chunk reply, then a merge reply whose topics are not a list.
    let judge = Arc::new(ScriptedJudge::new([REVENUE, r#"{"topics": "Revenue"}"#]));
    let analyzer = DocumentAnalyzer::new(&AppConfig::default(), judge);

    let err = analyzer
        .analyze_requests(vec![IngestionRequest::text("Revenue grew.", HashMap::new())])
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Pipeline(_)));
    assert_eq!(err.error_code(), ErrorCode::InvalidModelOutput);
}

#[tokio::test]
async fn test_config_file_drives_pipeline_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("default.toml"),
        r#"
[pipeline]
fan_out = 2
weight_strategy = "citation_length"

[cache]
enabled = false
"#,
    )
    .unwrap();
    let config = AppConfig::load_from(dir.path()).unwrap();

    // Two chunk replies, then the merge reply; weights come from citations.
    let merged = r#"{"topics": [
        {"name": "Revenue", "value": 10, "citation": "one two three", "pages": "1"},
        {"name": "Churn", "value": 90, "citation": "one", "pages": "2"}
    ]}"#;
    let judge = Arc::new(ScriptedJudge::new([REVENUE, REVENUE, merged]));
    let analyzer = DocumentAnalyzer::new(&config, judge.clone());

    let records = analyzer
        .analyze_requests(vec![IngestionRequest::text(
            "Revenue grew 20% YoY.\u{c}Churn fell to 3%.",
            HashMap::new(),
        )])
        .await
        .unwrap();

    assert_eq!(judge.calls(), 3);
    let values: Vec<(&str, f64)> = records.iter().map(|r| (r.name.as_str(), r.value)).collect();
    assert_eq!(values, vec![("Revenue", 75.0), ("Churn", 25.0)]);
}
