use claim_summarizer::core::{ConfigProvider, Pipeline, Storage};
use claim_summarizer::domain::model::{ClaimAnswers, ClaimType, ExportFormat, SourceDocument};
use claim_summarizer::domain::ports::TextCleaner;
use claim_summarizer::llm::{LlmClient, LlmConfig};
use claim_summarizer::{ClaimPipeline, Result};
use httpmock::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct NullStorage;

impl Storage for NullStorage {
    async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

struct LifeClaimConfig {
    documents: Vec<PathBuf>,
    llm: LlmConfig,
    formats: Vec<ExportFormat>,
}

impl ConfigProvider for LifeClaimConfig {
    fn output_path(&self) -> &str {
        "unused"
    }

    fn claim_type(&self) -> ClaimType {
        ClaimType::Life
    }

    fn documents(&self) -> Vec<SourceDocument> {
        self.documents.iter().map(SourceDocument::primary).collect()
    }

    fn answers(&self) -> ClaimAnswers {
        ClaimAnswers::default()
    }

    fn export_formats(&self) -> &[ExportFormat] {
        &self.formats
    }

    fn bundle(&self) -> bool {
        false
    }

    fn concurrent_documents(&self) -> usize {
        1
    }

    fn config_dir(&self) -> Option<&Path> {
        None
    }

    fn llm(&self) -> Option<LlmConfig> {
        Some(self.llm.clone())
    }

    fn show_text(&self) -> bool {
        false
    }
}

fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        enabled: true,
        endpoint: server.base_url(),
        model: "llama3.1:8b".to_string(),
        timeout_secs: 5,
        ..LlmConfig::default()
    }
}

/// 測試 LLM 修正後的文字被用來抽取欄位
#[tokio::test]
async fn test_cleaned_text_feeds_field_extraction() {
    let server = MockServer::start();
    let generate = server.mock(|when, then| {
        when.method(POST)
            .path("/api/generate")
            .json_body_partial(r#"{"model": "llama3.1:8b", "stream": false}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "model": "llama3.1:8b",
                "response": "Policy No: LIF445566\nPlace of Death: Pune",
                "done": true
            }));
    });

    let dir = TempDir::new().unwrap();
    let claim = dir.path().join("death_claim.txt");
    std::fs::write(&claim, "Po1icy N0 : LIF445566\nP1ace of Deatn: Pune").unwrap();

    let config = LifeClaimConfig {
        documents: vec![claim],
        llm: llm_config(&server),
        formats: vec![ExportFormat::Markdown],
    };
    let pipeline = ClaimPipeline::new(NullStorage, config).unwrap();

    let batch = pipeline.extract().await.unwrap();
    let report = pipeline.transform(batch).await.unwrap();

    generate.assert();
    assert_eq!(report.summary.get("Policy Number"), Some("LIF445566"));
    assert_eq!(
        report.summary.get("Place of Death (Death Certificate)"),
        Some("Pune")
    );
}

/// 測試 LLM 服務錯誤時沿用原始文字
#[tokio::test]
async fn test_server_error_keeps_original_text() {
    let server = MockServer::start();
    let generate = server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(500).body("model not loaded");
    });

    let dir = TempDir::new().unwrap();
    let claim = dir.path().join("death_claim.txt");
    std::fs::write(&claim, "Policy No: LIF111222").unwrap();

    let config = LifeClaimConfig {
        documents: vec![claim],
        llm: llm_config(&server),
        formats: vec![ExportFormat::Markdown],
    };
    let pipeline = ClaimPipeline::new(NullStorage, config).unwrap();

    let batch = pipeline.extract().await.unwrap();
    let report = pipeline.transform(batch).await.unwrap();

    generate.assert();
    assert_eq!(report.summary.get("Policy Number"), Some("LIF111222"));
}

/// 測試客戶端把 HTTP 錯誤轉成 LlmError
#[tokio::test]
async fn test_client_reports_http_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(503);
    });

    let client = LlmClient::new(llm_config(&server)).unwrap();
    let err = client.clean("Policy No: LIF111222").await.unwrap_err();

    assert!(err.to_string().contains("503"));
    assert_eq!(err.exit_code(), 0);
}

/// 測試空白回應視為失敗
#[tokio::test]
async fn test_client_rejects_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200).json_body(serde_json::json!({ "response": "   " }));
    });

    let client = LlmClient::new(llm_config(&server)).unwrap();
    assert!(client.clean("Policy No: LIF111222").await.is_err());
}
