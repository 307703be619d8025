//! Site24x7 Telemetry Exporter Binary
//!
//! Replays decoded telemetry batches from JSON files through the exporter,
//! applying the configured retry policy around each upload.

use clap::Parser;
use site24x7_exporter::{
    Config, LogData, Result, Site24x7Exporter, TelemetryConsumer, TraceData,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload decoded telemetry batches to the Site24x7 ingestion API
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON trace batch files to upload, in order
    #[arg(long = "traces", value_name = "FILE")]
    traces: Vec<PathBuf>,

    /// JSON log batch files to upload, in order
    #[arg(long = "logs", value_name = "FILE")]
    logs: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    initialize_tracing();

    info!(
        "Starting Site24x7 telemetry exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    // Load configuration
    let config = Config::from_env();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Exporter configuration - Endpoint: {}, Archive: {}, Timeout: {:?}",
        config.url,
        if config.path.is_empty() {
            "disabled"
        } else {
            &config.path
        },
        config.request_timeout
    );

    let max_retries = config.max_retries;
    let retry_backoff_ms = config.retry_backoff_ms;

    // Create and start exporter
    let exporter = Site24x7Exporter::new(config)?;
    exporter.start().await?;

    for path in &args.traces {
        let batch: TraceData = read_batch(path)?;
        info!(
            "Uploading trace batch {} ({} spans)",
            path.display(),
            batch.span_count()
        );
        deliver_with_retry(max_retries, retry_backoff_ms, || {
            exporter.consume_traces(batch.clone())
        })
        .await?;
    }

    for path in &args.logs {
        let batch: LogData = read_batch(path)?;
        info!(
            "Uploading log batch {} ({} records)",
            path.display(),
            batch.log_record_count()
        );
        deliver_with_retry(max_retries, retry_backoff_ms, || {
            exporter.consume_logs(batch.clone())
        })
        .await?;
    }

    exporter.shutdown().await?;
    info!("All batches uploaded");
    Ok(())
}

/// Parse one batch file
fn read_batch<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run one upload, retrying with exponential backoff per the configuration
async fn deliver_with_retry<F, Fut>(
    max_retries: u32,
    retry_backoff_ms: u64,
    mut upload: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut attempt = 0;

    loop {
        match upload().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempt += 1;
                if attempt > max_retries {
                    error!("Upload failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }

                let backoff_ms = retry_backoff_ms * 2_u64.pow(attempt - 1);
                warn!(
                    "Upload attempt {} failed, retrying in {}ms: {}",
                    attempt, backoff_ms, e
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
