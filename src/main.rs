use clap::Parser;
use media_ocr_etl::app::pipelines::{run_link_extraction, run_ocr, tesseract_from_config};
use media_ocr_etl::utils::error::{EtlError, ErrorSeverity};
use media_ocr_etl::utils::logger;
use media_ocr_etl::{AppConfig, CliArgs, Job, LocalStorage, RunReport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting media-ocr-etl ({:?} job)", args.job);
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(3);
        }
    };

    // 命令列覆蓋設定
    apply_overrides(&mut config, &args);

    let validation = match args.job {
        Job::Links => config.validate_links_job(),
        Job::Ocr => config.validate_ocr_job(),
    };

    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if args.dry_run {
        display_plan(&config, args.job);
        return Ok(());
    }

    let result = execute(&config, args.job).await;

    match result {
        Ok(report) => report_success(&report),
        Err(e) => {
            tracing::error!(
                "❌ ETL run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

async fn execute(config: &AppConfig, job: Job) -> media_ocr_etl::Result<RunReport> {
    let storage = LocalStorage::default();
    match job {
        Job::Links => run_link_extraction(config, storage).await,
        Job::Ocr => run_ocr(config, storage, tesseract_from_config(config)?).await,
    }
}

fn apply_overrides(config: &mut AppConfig, args: &CliArgs) {
    if args.monitor.is_none() && args.progress.is_none() {
        return;
    }

    let monitoring = config.monitoring.get_or_insert_with(Default::default);
    if let Some(enabled) = args.monitor {
        monitoring.enabled = enabled;
        tracing::info!("🔧 Monitoring overridden to: {}", enabled);
    }
    if let Some(progress) = args.progress {
        monitoring.progress = Some(progress);
    }
}

fn exit_code(e: &EtlError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_success(report: &RunReport) {
    tracing::info!("✅ ETL run completed successfully!");
    tracing::info!(
        "📊 {} items enumerated, {} written, {} skipped",
        report.enumerated,
        report.succeeded(),
        report.failed()
    );
    if !report.failures.is_empty() {
        tracing::debug!("Skipped positions: {:?}", report.failures);
    }

    println!("✅ ETL run completed successfully!");
    println!("📁 Output saved to: {}", report.output_path);
}

fn display_plan(config: &AppConfig, job: Job) {
    println!("🔍 Dry Run Analysis:");
    println!();

    match job {
        Job::Links => {
            if let (Ok(twitter), Ok(links)) = (config.twitter(), config.links()) {
                println!("📡 Source: timeline of @{}", twitter.screen_name);
                println!("  Endpoint: {}", twitter.api_base());
                println!("  Page size: {}", twitter.page_size());
                println!("  Include retweets: {}", twitter.include_retweets());
                println!("🔄 Transform: entities.media[0].{}", links.media_field());
                println!("💾 Output: {}", links.output_path);
                println!("  Header: {}", links.header().as_deref().unwrap_or("(none)"));
            }
        }
        Job::Ocr => {
            if let Ok(ocr) = config.ocr() {
                println!("📄 Source: column {} of {}", ocr.column(), ocr.input_path);
                println!(
                    "🛠️ OCR: {} (language: {})",
                    ocr.tesseract_path(),
                    ocr.language.as_deref().unwrap_or("default")
                );
                println!("💾 Output: {}", ocr.output_path);
                println!("  Header: {}", ocr.header().as_deref().unwrap_or("(none)"));
            }
        }
    }

    println!("  Monitoring: {}", config.monitoring_enabled());
    println!();
    println!("✅ Dry run analysis complete.");
}
