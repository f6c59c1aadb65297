use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use stackmatch::breaker::CircuitBreaker;
use stackmatch::catalog::{self, PartnerCategory};
use stackmatch::config::Config;
use stackmatch::domain::Selection;
use stackmatch::engine::MatchEngine;
use stackmatch::llm::GeminiClient;
use stackmatch::telemetry::{BufferSink, EventSink, FanoutSink, Severity, TracingSink};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stackmatch")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("stackmatch.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Analyze { file } => handle_analyze(file, config).await,
        Commands::Catalog => handle_catalog(),
    }
}

async fn handle_analyze(file: &Path, config: &Config) -> Result<()> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let selections: Vec<Selection> =
        serde_json::from_str(&contents).context("Selections file is not a JSON selection array")?;

    if selections.is_empty() {
        println!("{}", "No selections to analyze".yellow());
        return Ok(());
    }

    for selection in &selections {
        if !catalog::is_known(&selection.category, &selection.value) {
            println!(
                "{} {} / {} is not in the catalog",
                "Unrecognized:".yellow(),
                selection.category,
                selection.value
            );
        }
    }

    info!("Analyzing {} selections from {}", selections.len(), file.display());

    let buffer = Arc::new(BufferSink::new());
    let sink: Arc<dyn EventSink> = Arc::new(FanoutSink::new(vec![
        buffer.clone() as Arc<dyn EventSink>,
        Arc::new(TracingSink::new()) as Arc<dyn EventSink>,
    ]));
    let breaker = CircuitBreaker::new((&config.breaker).into(), sink.clone());
    let client = GeminiClient::new((&config.llm).into())?;
    let engine = MatchEngine::new(Arc::new(client), breaker, sink);

    match engine.run_batch(selections).await {
        Ok(report) => {
            println!("\n{}", "Executive Insight".bold());
            println!("  {}", report.summary.italic());

            println!("\n{}", "Strategic Next Steps".bold());
            if report.recommendations.is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for (idx, step) in report.recommendations.iter().enumerate() {
                println!("  {}. {}", idx + 1, step);
            }

            println!("\n{}", "Provisioned Ecosystem".bold());
            for item in &report.items {
                let risk = match item.risk.to_string().as_str() {
                    "low" => item.risk.to_string().green(),
                    "med" => item.risk.to_string().yellow(),
                    _ => item.risk.to_string().red(),
                };
                println!(
                    "  {} {} [{}]",
                    item.selection.category.dimmed(),
                    item.selection.value,
                    risk
                );
            }
        }
        Err(e) => {
            println!("{} {}", "Analysis failed:".red(), e);
        }
    }

    let state = engine.breaker().state().await;
    println!("\n{} {}", "Circuit:".bold(), state);

    print_telemetry(&buffer);
    Ok(())
}

fn print_telemetry(buffer: &BufferSink) {
    println!("\n{}", "Engine Diagnostics".bold());
    for record in buffer.snapshot() {
        let time = chrono::DateTime::from_timestamp_millis(record.timestamp)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        let line = format!(
            "[{}] {}: {}",
            time,
            record.event.event_type(),
            record.payload()
        );
        match record.severity() {
            Severity::Error => println!("  {}", line.red()),
            Severity::Warn => println!("  {}", line.yellow()),
            _ => println!("  {}", line.dimmed()),
        }
    }
}

fn handle_catalog() -> Result<()> {
    println!("{} partner catalog", catalog::PRODUCT_NAME.bold());
    for category in PartnerCategory::ALL {
        println!("\n{} ({})", category.label().bold(), category.key().dimmed());
        for option in category.options() {
            println!("  - {}", option);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
