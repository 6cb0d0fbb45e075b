use crate::config::claim_config::ClaimConfig;
use crate::core::fields::extract_summary;
use crate::core::report::{answer_warnings, build_preamble, build_sections, render_body};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    ClaimAnswers, ClaimSummary, ClaimType, DocumentKind, DocumentRole, ExtractedText,
    ExtractionBatch, ExtractionFailure, ExtractionMethod, SourceDocument, SourceRecord,
    SummaryReport,
};
use crate::domain::ports::{TextCleaner, TextExtractor};
use crate::export;
use crate::extract::{detect_kind, preview, CommandLineExtractor};
use crate::llm::LlmClient;
use crate::utils::error::{Result, SummarizerError};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const NO_CONTENT_WARNING: &str =
    "No relevant information could be extracted from the uploaded documents.";

fn source_record(extracted: &ExtractedText, characters: usize) -> SourceRecord {
    SourceRecord {
        key: extracted.key.clone(),
        path: extracted.document.path.clone(),
        role: extracted.document.role,
        kind: Some(extracted.kind),
        method: Some(extracted.method),
        characters,
        extracted: true,
    }
}

/// 依理賠類型與回答決定哪些文件要抽取
#[derive(Debug, Clone, Default)]
pub struct DocumentPlan {
    /// (原始文字索引鍵, 文件)，主要文件在前
    pub extract: Vec<(String, SourceDocument)>,
    pub acknowledged: Vec<SourceDocument>,
    pub ignored: Vec<(SourceDocument, String)>,
}

pub fn plan_documents(
    claim_type: ClaimType,
    answers: &ClaimAnswers,
    documents: Vec<SourceDocument>,
) -> DocumentPlan {
    let mut plan = DocumentPlan::default();
    let mut supporting = Vec::new();

    let health = claim_type == ClaimType::Health;
    let network = answers.hospital_network.is_yes();
    let cashless = answers.cashless_facility.is_yes();

    for document in documents {
        let name = document.file_name();
        match document.role {
            DocumentRole::Primary => plan.extract.push((name, document)),
            DocumentRole::HospitalBill if health && !network => {
                supporting.push((format!("ReimbursementBill_{}", name), document))
            }
            DocumentRole::HospitalBill if health && !cashless => {
                supporting.push((format!("HospitalBill_{}", name), document))
            }
            DocumentRole::HospitalBill => plan.ignored.push((
                document,
                "hospital bills only apply to non-cashless or reimbursement health claims"
                    .to_string(),
            )),
            DocumentRole::HealthCard if health && network && cashless => {
                plan.acknowledged.push(document)
            }
            DocumentRole::HealthCard => plan.ignored.push((
                document,
                "health cards only apply to cashless network health claims".to_string(),
            )),
            DocumentRole::FirAffidavit
                if claim_type == ClaimType::Vehicle && answers.fir_filed.is_yes() =>
            {
                supporting.push((format!("FIR_Affidavit_{}", name), document))
            }
            DocumentRole::FirAffidavit => plan.ignored.push((
                document,
                "FIR/affidavit documents only apply to vehicle claims with an FIR filed"
                    .to_string(),
            )),
        }
    }

    plan.extract.extend(supporting);
    plan
}

/// 回答覆寫到摘要中
pub fn apply_answers(claim_type: ClaimType, answers: &ClaimAnswers, summary: &mut ClaimSummary) {
    match claim_type {
        ClaimType::Health => {
            summary.set("Hospital Type Network", answers.hospital_network.to_string());
            if answers.hospital_network.is_yes() {
                summary.set(
                    "Cashless Facility Availed",
                    answers.cashless_facility.to_string(),
                );
            } else {
                summary.set("Claim Type", "Reimbursement Claim");
            }
        }
        ClaimType::Vehicle => summary.set("FIR Status", answers.fir_filed.to_string()),
        ClaimType::Life => {}
    }
}

fn read_document(
    extractor: &dyn TextExtractor,
    path: &Path,
) -> Result<(DocumentKind, String, ExtractionMethod)> {
    let kind = detect_kind(path)?;
    let (text, method) = extractor.extract(path, kind)?;
    Ok((kind, text, method))
}

pub struct ClaimPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    rules: ClaimConfig,
    extractor: Arc<dyn TextExtractor>,
    cleaner: Option<Box<dyn TextCleaner>>,
}

impl<S: Storage, C: ConfigProvider> ClaimPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let rules = ClaimConfig::load(config.claim_type(), config.config_dir())?;
        let cleaner: Option<Box<dyn TextCleaner>> = match config.llm() {
            Some(llm) if llm.enabled => {
                info!("🤖 LLM cleanup enabled ({} at {})", llm.model, llm.endpoint);
                Some(Box::new(LlmClient::new(llm)?))
            }
            _ => None,
        };

        Ok(Self {
            storage,
            config,
            rules,
            extractor: Arc::new(CommandLineExtractor::default()),
            cleaner,
        })
    }

    pub fn with_extractor(mut self, extractor: impl TextExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_cleaner(mut self, cleaner: impl TextCleaner + 'static) -> Self {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    pub fn rules(&self) -> &ClaimConfig {
        &self.rules
    }

    /// 清理一份文字、抽出欄位並補進尚未有值的欄位
    async fn merge_text(
        &self,
        extracted: &ExtractedText,
        summary: &mut ClaimSummary,
    ) -> SourceRecord {
        let text = self.clean_text(extracted).await;
        let found = extract_summary(&text, &self.rules);
        let added = summary.merge_missing(&found);
        debug!(
            "🔎 {}: {} fields matched, {} new",
            extracted.key,
            found.len(),
            added
        );
        source_record(extracted, text.chars().count())
    }

    async fn clean_text(&self, extracted: &ExtractedText) -> String {
        let Some(cleaner) = &self.cleaner else {
            return extracted.text.clone();
        };

        match cleaner.clean(&extracted.text).await {
            Ok(cleaned) => {
                debug!("🧹 Cleaned text of {}", extracted.key);
                cleaned
            }
            Err(e) => {
                warn!(
                    "⚠️ LLM cleanup failed for {}, keeping original text: {}",
                    extracted.key, e
                );
                extracted.text.clone()
            }
        }
    }

    fn log_routing(&self, claim_type: ClaimType, answers: &ClaimAnswers) {
        match claim_type {
            ClaimType::Vehicle if !answers.fir_filed.is_yes() => {
                info!("No supporting police document is required.")
            }
            ClaimType::Health if !answers.hospital_network.is_yes() => {
                info!("🏥 It is a reimbursement claim.")
            }
            _ => {}
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ClaimPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractionBatch> {
        let claim_type = self.config.claim_type();
        let answers = self.config.answers();
        let plan = plan_documents(claim_type, &answers, self.config.documents());
        self.log_routing(claim_type, &answers);

        let mut batch = ExtractionBatch::default();
        for (document, reason) in plan.ignored {
            warn!("⚠️ Ignoring {}: {}", document.path.display(), reason);
            batch
                .warnings
                .push(format!("Ignored {}: {}", document.file_name(), reason));
        }
        for card in &plan.acknowledged {
            info!("🪪 Health Insurance Card '{}' uploaded.", card.file_name());
        }
        batch.acknowledged = plan.acknowledged;

        let attempted = plan.extract.len();
        if attempted == 0 {
            return Err(SummarizerError::NoDocumentsExtracted { attempted });
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_documents().max(1)));
        let mut handles = Vec::with_capacity(attempted);
        for (key, document) in plan.extract {
            let permit = Arc::clone(&semaphore).acquire_owned().await.map_err(|e| {
                SummarizerError::ProcessingError {
                    message: format!("Extraction semaphore closed: {}", e),
                }
            })?;
            let extractor = Arc::clone(&self.extractor);
            debug!("Extracting {} from {}", key, document.path.display());

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let result = read_document(extractor.as_ref(), &document.path);
                (key, document, result)
            }));
        }

        for handle in handles {
            let (key, document, result) =
                handle
                    .await
                    .map_err(|e| SummarizerError::ProcessingError {
                        message: format!("Extraction task failed: {}", e),
                    })?;

            match result {
                Ok((kind, text, method)) if !text.trim().is_empty() => {
                    info!(
                        "📄 Extracted {} chars from {} ({:?})",
                        text.chars().count(),
                        document.file_name(),
                        method
                    );
                    if self.config.show_text() {
                        println!("\n📄 {}\n{}\n", key, preview(&text));
                    }
                    batch.texts.push(ExtractedText {
                        key,
                        document,
                        kind,
                        method,
                        text,
                    });
                }
                Ok(_) => {
                    warn!("⚠️ No text found in {}", document.file_name());
                    batch.failures.push(ExtractionFailure {
                        name: document.file_name(),
                        reason: "no text found".to_string(),
                    });
                }
                Err(e) => {
                    warn!("❌ Could not extract {}: {}", document.file_name(), e);
                    batch.failures.push(ExtractionFailure {
                        name: document.file_name(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if batch.texts.is_empty() {
            return Err(SummarizerError::NoDocumentsExtracted { attempted });
        }
        Ok(batch)
    }

    async fn transform(&self, batch: ExtractionBatch) -> Result<SummaryReport> {
        let claim_type = self.config.claim_type();
        let answers = self.config.answers();

        let mut summary = ClaimSummary::new();
        let mut sources = Vec::with_capacity(batch.texts.len() + batch.acknowledged.len());

        let (primary, supporting): (Vec<_>, Vec<_>) = batch
            .texts
            .iter()
            .partition(|extracted| extracted.document.role == DocumentRole::Primary);

        for extracted in primary {
            sources.push(self.merge_text(extracted, &mut summary).await);
        }

        // 主要文件沒有任何欄位時，帳單與 FIR 不併入
        for extracted in supporting {
            if summary.is_empty() {
                debug!(
                    "⏭️ {}: primary documents matched nothing, not merged",
                    extracted.key
                );
                sources.push(source_record(extracted, extracted.text.chars().count()));
            } else {
                sources.push(self.merge_text(extracted, &mut summary).await);
            }
        }

        for card in &batch.acknowledged {
            sources.push(SourceRecord {
                key: format!("HealthCard_{}", card.file_name()),
                path: card.path.clone(),
                role: card.role,
                kind: None,
                method: None,
                characters: 0,
                extracted: false,
            });
        }

        let mut warnings = batch.warnings;
        if summary.is_empty() {
            warn!("⚠️ {}", NO_CONTENT_WARNING);
            warnings.push(NO_CONTENT_WARNING.to_string());
        } else {
            apply_answers(claim_type, &answers, &mut summary);
        }
        warnings.extend(answer_warnings(&answers));

        let sections = build_sections(&summary, &self.rules);
        let body = render_body(&sections);
        let preamble = build_preamble(claim_type, &answers, &summary);
        info!(
            "🧾 Summary has {} fields in {} sections",
            summary.len(),
            sections.len()
        );

        Ok(SummaryReport {
            claim_type,
            generated_at: Utc::now(),
            answers,
            preamble,
            sections,
            body,
            summary,
            sources,
            failures: batch.failures,
            warnings,
        })
    }

    async fn load(&self, report: &SummaryReport) -> Result<Vec<String>> {
        let files = export::render_all(report, self.config.export_formats())?;
        let output_dir = Path::new(self.config.output_path());

        if self.config.bundle() {
            let name = export::bundle_file_name();
            let data = export::bundle(&files)?;
            debug!("Writing bundle of {} files ({} bytes)", files.len(), data.len());
            self.storage.write_file(&name, &data).await?;
            return Ok(vec![output_dir.join(name).display().to_string()]);
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, data) in &files {
            debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
            written.push(output_dir.join(name).display().to_string());
        }
        Ok(written)
    }
}
