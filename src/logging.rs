//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to the console and,
//! optionally, to a JSON log file for debugging concurrent pipeline runs.

use crate::config::{ConfigManager, LoggingConfig};
use crate::state_machine::{PipelineStage, StageStatus};
use chrono::Utc;
use std::fs;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment));

        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let mut log_file = None;
        let file_layer = if config.file_output {
            match fs::create_dir_all(&config.directory) {
                Ok(()) => {
                    let pid = process::id();
                    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
                    let file_name = format!("{environment}.{pid}.{timestamp}.log");
                    log_file = Some(config.directory.join(&file_name));

                    let file_appender =
                        tracing_appender::rolling::never(&config.directory, file_name);
                    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                    // The writer flushes on drop; keep it alive for the process lifetime
                    std::mem::forget(guard);

                    Some(
                        fmt::layer()
                            .with_writer(file_writer)
                            .with_target(true)
                            .with_thread_ids(true)
                            .with_level(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(build_filter(&log_level)),
                    )
                }
                Err(e) => {
                    eprintln!(
                        "Failed to create log directory {}: {e}; logging to console only",
                        config.directory.display()
                    );
                    None
                }
            }
        } else {
            None
        };

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        // Use try_init to avoid panic if global subscriber already set
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            level = %log_level,
            log_file = ?log_file.as_ref().map(|p| p.display().to_string()),
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// `RUST_LOG` wins over the configured level when set
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    ConfigManager::detect_environment()
}

/// Get log level based on environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for stage transitions and progress
pub fn log_stage_operation(
    stage: PipelineStage,
    status: StageStatus,
    progress: Option<u8>,
    details: Option<&str>,
) {
    tracing::info!(
        stage = %stage,
        status = %status,
        progress = progress,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🔀 STAGE_OPERATION"
    );
}

/// Log structured data for per-candidate operations
pub fn log_candidate_operation(
    operation: &str,
    candidate_id: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        candidate_id = %candidate_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🧪 CANDIDATE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
