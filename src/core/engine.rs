use crate::core::Pipeline;
use crate::domain::model::SummaryReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 一次執行的結果；沒有可用內容時 `written` 為空
#[derive(Debug)]
pub struct RunOutcome {
    pub report: SummaryReport,
    pub written: Vec<String>,
}

impl RunOutcome {
    pub fn skipped(&self) -> bool {
        !self.report.has_content()
    }
}

pub struct SummaryEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SummaryEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting claim summarization");
        self.monitor.log_stats("Start");

        tracing::info!("📥 Extracting document text...");
        let batch = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} document(s), {} failed",
            batch.texts.len(),
            batch.failures.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("🔄 Building summary...");
        let report = self.pipeline.transform(batch).await?;
        tracing::info!("🔄 Summary holds {} field(s)", report.summary.len());
        self.monitor.log_stats("Transform");

        if !report.has_content() {
            tracing::warn!("⚠️ Nothing to export, skipping load");
            self.monitor.log_final_stats();
            return Ok(RunOutcome {
                report,
                written: Vec::new(),
            });
        }

        tracing::info!("💾 Writing summary files...");
        let written = self.pipeline.load(&report).await?;
        for path in &written {
            tracing::info!("💾 Saved {}", path);
        }
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome { report, written })
    }
}
