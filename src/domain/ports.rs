use crate::domain::model::{
    ClaimAnswers, ClaimType, DocumentKind, ExportFormat, ExtractionBatch, ExtractionMethod,
    SourceDocument, SummaryReport,
};
use crate::llm::LlmConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn claim_type(&self) -> ClaimType;
    fn documents(&self) -> Vec<SourceDocument>;
    fn answers(&self) -> ClaimAnswers;
    fn export_formats(&self) -> &[ExportFormat];
    fn bundle(&self) -> bool;
    fn concurrent_documents(&self) -> usize;
    fn config_dir(&self) -> Option<&Path>;
    fn llm(&self) -> Option<LlmConfig>;
    fn show_text(&self) -> bool;
}

/// 阻塞式的文字抽取，在 blocking 執行緒池上跑
pub trait TextExtractor: Send + Sync + 'static {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<(String, ExtractionMethod)>;
}

#[async_trait]
pub trait TextCleaner: Send + Sync {
    async fn clean(&self, text: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractionBatch>;
    async fn transform(&self, batch: ExtractionBatch) -> Result<SummaryReport>;
    async fn load(&self, report: &SummaryReport) -> Result<Vec<String>>;
}
