use clap::Parser;
use claim_summarizer::core::engine::RunOutcome;
use claim_summarizer::utils::{logger, validation::Validate};
use claim_summarizer::{ClaimPipeline, CliConfig, LocalStorage, SummarizerError, SummaryEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting claim-summarizer CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match ClaimPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };

    let engine = SummaryEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    for failure in &outcome.report.failures {
        println!("⚠️ {}: {}", failure.name, failure.reason);
    }
    for warning in &outcome.report.warnings {
        println!("⚠️ {}", warning);
    }

    // 沒有內容時警告已在上面印出
    if outcome.skipped() {
        return;
    }

    println!("✅ Claim summary generated!");
    for path in &outcome.written {
        println!("📁 Output saved to: {}", path);
    }
}

fn exit_with(e: SummarizerError) -> ! {
    tracing::error!(
        "❌ Summarization failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}
