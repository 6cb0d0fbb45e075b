use clap::Parser;
use claim_summarizer::config::claim_config::ClaimConfig;
use claim_summarizer::core::plan_documents;
use claim_summarizer::core::ConfigProvider;
use claim_summarizer::export::{bundle_file_name, output_file_name};
use claim_summarizer::extract::CommandLineExtractor;
use claim_summarizer::utils::{logger, validation::Validate};
use claim_summarizer::{ClaimPipeline, LocalStorage, SummaryEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-summarize")]
#[command(about = "Claim summarizer driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "claim-summary.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.log_json() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based claim summarizer");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let result = match ClaimPipeline::new(storage, config) {
        Ok(pipeline) => SummaryEngine::new_with_monitoring(pipeline, monitor_enabled)
            .run()
            .await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            for failure in &outcome.report.failures {
                println!("⚠️ {}: {}", failure.name, failure.reason);
            }
            for warning in &outcome.report.warnings {
                println!("⚠️ {}", warning);
            }
            if !outcome.skipped() {
                println!("✅ Claim summary generated!");
                for path in &outcome.written {
                    println!("📁 Output saved to: {}", path);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Summarization failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let formats: Vec<&str> = config
        .export_formats()
        .iter()
        .map(|format| format.label())
        .collect();

    println!("📋 Configuration Summary:");
    println!("  Claim Type: {}", config.claim_type());
    println!("  Documents: {}", config.documents().len());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", formats.join(", "));
    println!("  Bundle: {}", config.bundle());
    println!("  Concurrent Documents: {}", config.concurrent_documents());
    println!(
        "  LLM Cleanup: {}",
        config.llm().map(|llm| llm.enabled).unwrap_or(false)
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let answers = config.answers();
    println!("📝 Claim Answers:");
    println!("  Policy Assigned: {}", answers.policy_assigned);
    println!("  KYC Verified: {}", answers.kyc_verified);
    println!("  Hospital In Network: {}", answers.hospital_network);
    println!("  Cashless Facility: {}", answers.cashless_facility);
    println!("  FIR Filed: {}", answers.fir_filed);

    // 文件路由分析
    let plan = plan_documents(config.claim_type(), &answers, config.documents());
    println!();
    println!("📄 Documents To Extract:");
    for (key, document) in &plan.extract {
        println!("  {} <- {}", key, document.path.display());
    }
    for document in &plan.acknowledged {
        println!("  ☑️ Acknowledged only: {}", document.path.display());
    }
    for (document, reason) in &plan.ignored {
        println!("  ⏭️ Ignored {}: {}", document.path.display(), reason);
    }

    // 欄位規則分析
    let rules = ClaimConfig::load(config.claim_type(), config.config_dir())?;
    println!();
    println!("🔎 Field Rules:");
    println!("  Fields: {}", rules.fields.len());
    println!("  Sections: {}", rules.summary_sections.len());

    println!();
    println!("🛠️ External Tools:");
    for (tool, available) in CommandLineExtractor::check_tools() {
        let mark = if available { "✅" } else { "❌" };
        println!("  {} {}", mark, tool);
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if config.bundle() {
        println!("  Package: {}", bundle_file_name());
    } else {
        for format in config.export_formats() {
            println!("  File: {}", output_file_name(*format));
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
