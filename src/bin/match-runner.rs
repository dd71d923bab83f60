//! # Match Runner
//!
//! Runs the matching pipeline end to end against a JSON fixture holding an
//! evidence profile, candidate studies and their extracted criteria.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use trial_match_core::adapters::{MatchFixture, TemplateSummarizer};
use trial_match_core::config::ConfigManager;
use trial_match_core::events::ProgressEvent;
use trial_match_core::logging::init_structured_logging;
use trial_match_core::models::PipelineRun;
use trial_match_core::orchestration::{InMemoryCriteriaCache, PipelineCoordinator, RunOptions};
use trial_match_core::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "match-runner")]
#[command(about = "Match an evidence profile against fixture clinical studies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Fixture file with profile, candidates and criteria (JSON)
    #[arg(short, long)]
    fixture: PathBuf,

    /// Configuration directory (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Environment name (default: MATCHER_ENV, APP_ENV or development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Override the configured candidate cap
    #[arg(long)]
    max_candidates: Option<usize>,

    /// Override the Extraction and Matching concurrency ceiling
    #[arg(long)]
    concurrency: Option<usize>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    }
    .context("failed to load configuration")?;

    let mut config = manager.config().clone();
    if cli.verbose > 0 {
        let level = match cli.verbose {
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        config.logging.level = Some(level.to_string());
    }
    init_structured_logging(&config.logging);

    let fixture = MatchFixture::from_path(&cli.fixture)?;
    info!(
        fixture = %cli.fixture.display(),
        candidates = fixture.candidates.len(),
        environment = manager.environment(),
        "📂 Loaded fixture"
    );

    let coordinator = PipelineCoordinator::builder(
        Arc::new(fixture.discovery()),
        Arc::new(fixture.extraction()),
        Arc::new(TemplateSummarizer::new()),
    )
    .cache(Arc::new(InMemoryCriteriaCache::new()))
    .with_config(&config)
    .build();

    let cancellation = CancellationToken::new();
    let signal_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal_token.cancel();
        }
    });

    let mut options = RunOptions::from_config(&config).with_cancellation(cancellation);
    if let Some(max_candidates) = cli.max_candidates {
        options = options.with_max_candidates(max_candidates);
    }
    if let Some(concurrency) = cli.concurrency {
        options = options.with_concurrency(concurrency);
    }

    let sink = |event: ProgressEvent| {
        eprintln!(
            "[{:>3}%] {} {}",
            event.overall_percent, event.stage_state.stage, event.stage_state.status
        );
    };

    let run = coordinator
        .run(&fixture.profile, &sink, options)
        .await
        .context("matching run failed")?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Table => print_table(&run),
    }
    Ok(())
}

fn print_table(run: &PipelineRun) {
    println!("Run {} ({} found, {:.2?})", run.run_id, run.total_found, run.elapsed);
    println!();
    println!("{:<16} {:>5}  {:<17} SUMMARY", "STUDY", "SCORE", "CATEGORY");
    for outcome in &run.outcomes {
        println!(
            "{:<16} {:>5}  {:<17} {}",
            outcome.candidate_id,
            outcome.score,
            outcome.category.to_string(),
            outcome.summary
        );
    }

    if !run.dropped.is_empty() {
        println!();
        println!("Dropped:");
        for dropped in &run.dropped {
            println!(
                "  {} ({}): {}",
                dropped.candidate_id, dropped.stage, dropped.reason
            );
        }
    }

    if let Some(script) = run.voice_script() {
        println!();
        println!("Voice script:");
        println!("  {script}");
    }
}
