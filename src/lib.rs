//! Site24x7 Telemetry Exporter Library
//!
//! This library takes decoded trace and log batches, flattens every record
//! into the Site24x7 AppLogs schema and uploads the results over HTTP.

pub mod attributes;
pub mod config;
pub mod errors;
pub mod exporter;
pub mod logs;
pub mod record;
pub mod sink;
pub mod spans;
pub mod telemetry;
pub mod transport;

pub use config::Config;
pub use errors::{ExporterError, Result};
pub use exporter::{Site24x7Exporter, TelemetryConsumer};
pub use record::{FlatLog, FlatSpan};
pub use telemetry::{LogData, LogRecord, Span, TraceData};
pub use transport::{DeliveryClient, DeliveryReceipt, TelemetryKind};
