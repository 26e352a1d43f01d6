use clap::Parser;
use golden_mass::analysis::quantization::Step;
use golden_mass::catalog::CatalogSource;
use golden_mass::core::ConfigProvider;
use golden_mass::utils::{logger, validation::Validate};
use golden_mass::{AnalysisEngine, AnalysisPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml_analysis")]
#[command(about = "Golden-ratio mass analysis driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "golden-mass.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the reference particle from config
    #[arg(long)]
    reference: Option<String>,

    /// Override the quantisation step from config
    #[arg(long)]
    step: Option<Step>,

    /// Dry run - show what would be analysed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = TomlConfig::from_file(&args.config);

    // 初始化日誌 ([monitoring] log_level 可設定預設層級)
    logger::init_cli_logger_with_level(args.verbose, loaded.as_ref().ok().and_then(|c| c.log_level()));

    tracing::info!("🚀 Starting TOML-based golden-mass analysis");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(reference) = &args.reference {
        config.fit.reference = Some(reference.clone());
        tracing::info!("🔧 Reference overridden to: {}", reference);
    }
    if let Some(step) = args.step {
        config.fit.step = Some(step);
        tracing::info!("🔧 Step overridden to: {}", step);
    }

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
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Analysis: {} v{}",
        config.analysis.name,
        config.analysis.version.as_deref().unwrap_or("-")
    );
    println!("  Catalog: {}", config.catalog_source());
    println!("  Reference: {}", config.reference_particle());
    println!("  Step: {}", config.step());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Catalog Source:");
    match config.catalog_source().parse::<CatalogSource>() {
        Ok(CatalogSource::Builtin) => println!("  Built-in Standard Model table (17 particles)"),
        Ok(CatalogSource::File(path)) => println!("  File: {}", path.display()),
        Ok(CatalogSource::Database(path)) => println!("  SQLite database: {}", path.display()),
        Ok(CatalogSource::Remote(url)) => {
            println!("  HTTP: {}", url);
            println!("  Falls back to the built-in table on error or empty response");
        }
        Err(e) => println!("  ⚠️ {}", e),
    }
    println!(
        "  Coefficients: {}",
        config.coefficients_path().unwrap_or("built-in A5 table")
    );

    println!();
    println!("⚙️ Fit:");
    println!("  Reference particle: {}", config.reference_particle());
    println!(
        "  Lattice: {} ({} steps per unit exponent)",
        config.step(),
        config.step().divisions()
    );
    println!("  Error threshold: {}%", config.error_threshold_pct());

    let predictions = config.prediction_settings();
    println!();
    println!("🔮 Predictions:");
    println!(
        "  a in {:?}, b in {:?}, c in {:?}",
        predictions.bounds.a, predictions.bounds.b, predictions.bounds.c
    );
    println!("  q window: {:?}", predictions.q_window);
    println!("  Mass window (GeV): {:?}", predictions.mass_window);
    println!("  Limit: {}", predictions.limit);

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if config.compress() {
        println!("  Compression: analysis.zip (ZIP)");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
