//! Terminal pipeline stage: flatten batches, archive activity, deliver

use crate::config::Config;
use crate::errors::{ExporterError, Result};
use crate::logs::flatten_logs;
use crate::sink::DebugSink;
use crate::spans::flatten_traces;
use crate::telemetry::{LogData, TraceData};
use crate::transport::{DeliveryClient, TelemetryKind};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Consumer surface a pipeline hands decoded telemetry batches to.
#[async_trait]
pub trait TelemetryConsumer: Send + Sync {
    async fn consume_traces(&self, traces: TraceData) -> Result<()>;
    async fn consume_logs(&self, logs: LogData) -> Result<()>;
}

/// Exporter for the Site24x7 ingestion API
pub struct Site24x7Exporter {
    config: Config,
    client: DeliveryClient,
    exporter_id: String,
    // One export cycle at a time: batches never interleave on the wire or
    // in the archive.
    gate: Mutex<DebugSink>,
}

impl Site24x7Exporter {
    /// Create a new exporter from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(ExporterError::Config)?;

        let client = DeliveryClient::new(&config)?;
        let sink = DebugSink::new(config.path.clone());

        Ok(Self {
            config,
            client,
            exporter_id: Uuid::new_v4().to_string(),
            gate: Mutex::new(sink),
        })
    }

    /// Open the debug archive and announce the endpoint in use
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut sink = self.gate.lock().await;
        sink.open().await?;

        info!(
            "Starting exporter {} for endpoint {} (legacy: {})",
            self.exporter_id,
            self.config.url,
            self.client.is_legacy()
        );
        Ok(())
    }

    /// Flush and close the debug archive
    pub async fn shutdown(&self) -> Result<()> {
        let mut sink = self.gate.lock().await;
        sink.close().await?;

        info!("Exporter {} shutdown complete", self.exporter_id);
        Ok(())
    }

    /// Serialize the flat records and hand them to the delivery client,
    /// narrating the outcome into the archive.
    async fn export<T: serde::Serialize>(
        &self,
        sink: &mut DebugSink,
        kind: TelemetryKind,
        records: &[T],
    ) -> Result<()> {
        // The archive narrates traces as "data" and logs as "logs".
        let noun = match kind {
            TelemetryKind::Traces => "data",
            TelemetryKind::Logs => "logs",
        };
        sink.write_line(&format!("Transformed telemetry {} to site24x7 format.", noun))
            .await;

        let payload = match serde_json::to_vec(records) {
            Ok(payload) => payload,
            Err(e) => {
                sink.write_line(&format!("Error in converting telemetry {}.", noun))
                    .await;
                sink.write_line(&e.to_string()).await;
                return Err(ExporterError::Json(e));
            }
        };

        match self.client.send(kind, &payload, records.len()).await {
            Ok(receipt) => {
                sink.write_line(&format!("Posting telemetry {} to url.", kind))
                    .await;

                if !receipt.status.is_success() {
                    warn!(
                        "Exporter {}: endpoint answered {} for {} upload",
                        self.exporter_id, receipt.status, kind
                    );
                }
                match &receipt.upload_id {
                    Some(upload_id) => {
                        info!(
                            "Exporter {}: uploaded {} {} records, upload id {}",
                            self.exporter_id,
                            records.len(),
                            kind,
                            upload_id
                        );
                        sink.write_line(&format!("Upload ID: {}", upload_id)).await;
                    }
                    None => {
                        info!(
                            "Exporter {}: uploaded {} {} records ({})",
                            self.exporter_id,
                            records.len(),
                            kind,
                            receipt.status
                        );
                    }
                }
                if let Some(body) = &receipt.body {
                    sink.write_raw(body).await;
                }
                Ok(())
            }
            Err(e) => {
                error!(
                    "Exporter {}: failed to upload {}: {}",
                    self.exporter_id, kind, e
                );
                sink.write_line(&format!("Error in posting {} to url.", kind))
                    .await;
                sink.write_line(&e.to_string()).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TelemetryConsumer for Site24x7Exporter {
    #[instrument(skip(self, traces))]
    async fn consume_traces(&self, traces: TraceData) -> Result<()> {
        let mut sink = self.gate.lock().await;

        let records = flatten_traces(&traces);
        debug!(
            "Exporter {}: flattened {} spans from {} resource groups",
            self.exporter_id,
            records.len(),
            traces.resource_spans.len()
        );

        self.export(&mut sink, TelemetryKind::Traces, &records).await
    }

    #[instrument(skip(self, logs))]
    async fn consume_logs(&self, logs: LogData) -> Result<()> {
        let mut sink = self.gate.lock().await;

        let records = flatten_logs(&logs);
        debug!(
            "Exporter {}: flattened {} log records from {} resource groups",
            self.exporter_id,
            records.len(),
            logs.resource_logs.len()
        );

        self.export(&mut sink, TelemetryKind::Logs, &records).await
    }
}
