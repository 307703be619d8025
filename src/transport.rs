//! HTTP delivery of flattened telemetry to the ingestion API

use crate::config::Config;
use crate::errors::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::{Client, StatusCode};
use std::io::Write;
use tracing::debug;

/// Marker for endpoints still served by the deprecated Catalyst upload.
const LEGACY_ENDPOINT_MARKER: &str = "catalyst";

/// Which signal a payload carries. Selects the ingestion headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryKind {
    Traces,
    Logs,
}

impl TelemetryKind {
    /// Value of the `X-LogType` ingestion header.
    pub fn log_type(self) -> &'static str {
        match self {
            TelemetryKind::Traces => "s247apmopentelemetrytracing",
            TelemetryKind::Logs => "otellogs",
        }
    }

    /// User agent the ingestion API expects for this signal.
    pub fn user_agent(self) -> &'static str {
        match self {
            TelemetryKind::Traces => "site24x7exporter",
            TelemetryKind::Logs => "AWS-Lambda",
        }
    }
}

impl std::fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryKind::Traces => write!(f, "traces"),
            TelemetryKind::Logs => write!(f, "logs"),
        }
    }
}

/// Outcome of one upload.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// HTTP status returned by the endpoint.
    pub status: StatusCode,
    /// `x-uploadid` response header values, present on AppLogs uploads.
    pub upload_id: Option<String>,
    /// Full response body, read back only on legacy uploads.
    pub body: Option<String>,
}

/// HTTP client for the ingestion endpoint
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: Client,
    url: String,
    api_key: String,
    legacy: bool,
}

impl DeliveryClient {
    /// Create a new delivery client from the exporter configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            legacy: config.url.contains(LEGACY_ENDPOINT_MARKER),
        })
    }

    /// True when the configured endpoint takes the deprecated upload path.
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Upload one serialized batch. A reachable endpoint always yields a
    /// receipt; the HTTP status is reported, not judged.
    pub async fn send(
        &self,
        kind: TelemetryKind,
        payload: &[u8],
        record_count: usize,
    ) -> Result<DeliveryReceipt> {
        debug!(
            "Uploading {} {} records ({} bytes) to {}",
            record_count,
            kind,
            payload.len(),
            self.url
        );

        if self.legacy {
            self.send_legacy(payload).await
        } else {
            self.send_applogs(kind, payload, record_count).await
        }
    }

    /// AppLogs upload: gzip body plus the full ingestion header set.
    async fn send_applogs(
        &self,
        kind: TelemetryKind,
        payload: &[u8],
        record_count: usize,
    ) -> Result<DeliveryReceipt> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload)?;
        let body = encoder.finish()?;

        let response = self
            .client
            .post(&self.url)
            .header("X-DeviceKey", &self.api_key)
            .header("Content-Type", "application/json")
            .header("X-LogType", kind.log_type())
            .header("X-StreamMode", "1")
            .header("Log-Size", record_count.to_string())
            .header("Content-Encoding", "gzip")
            .header("User-Agent", kind.user_agent())
            .body(body)
            .send()
            .await?;

        // TODO: surface non-2xx statuses to the caller once the ingestion
        // API's failure responses are documented.
        let status = response.status();
        let values: Vec<&str> = response
            .headers()
            .get_all("x-uploadid")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        let upload_id = if values.is_empty() {
            None
        } else {
            Some(values.join(" "))
        };

        Ok(DeliveryReceipt {
            status,
            upload_id,
            body: None,
        })
    }

    /// Deprecated Catalyst upload: raw JSON with the key as a query
    /// parameter. The response body is read back for archival.
    async fn send_legacy(&self, payload: &[u8]) -> Result<DeliveryReceipt> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("license.key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        Ok(DeliveryReceipt {
            status,
            upload_id: None,
            body: Some(body),
        })
    }
}
