//! Flat vendor-schema records produced for delivery
//!
//! Field names mirror the Site24x7 AppLogs ingestion schema; the structs are
//! built once per source record and serialized straight to the wire.

use crate::attributes::{AttrMap, AttrValue};
use serde::Serialize;

/// Fixed agent identifier stamped on every delivered log record.
pub const AGENT_UID: &str = "otel-s247exporter";

/// One span attribute carried verbatim alongside the named projections.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CustomParam {
    pub key: String,
    pub value: AttrValue,
}

/// A span event with its timestamp scaled down to milliseconds.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FlatSpanEvent {
    pub timestamp: i64,
    pub name: String,
    #[serde(rename = "eventAttributes")]
    pub attributes: AttrMap,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FlatSpanLink {
    #[serde(rename = "link.spanID")]
    pub span_id: String,
    #[serde(rename = "link.traceID")]
    pub trace_id: String,
}

/// Denormalized span record.
///
/// The named host/thread/db/http fields are copies of span attributes that
/// also appear in `custom_params`; consumers get both the typed column and
/// the complete attribute record.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FlatSpan {
    pub trace_id: String,
    pub span_id: String,
    #[serde(rename = "parent_id")]
    pub parent_span_id: String,
    /// Display name of the trace's root span; empty when the batch carries
    /// no root for this trace.
    pub root_span_id: String,
    pub name: String,
    #[serde(rename = "span_kind")]
    pub kind: String,
    /// Nanoseconds since the Unix epoch.
    pub start_time: i64,
    /// Nanoseconds since the Unix epoch.
    pub end_time: i64,
    /// Milliseconds, floating point so sub-millisecond spans are not
    /// truncated to zero.
    pub duration: f64,
    pub service_name: String,
    #[serde(rename = "exception_message")]
    pub exception_messages: Vec<String>,
    #[serde(rename = "stack_trace")]
    pub exception_stack_traces: Vec<String>,
    #[serde(rename = "exception_class")]
    pub exception_types: Vec<String>,
    pub instrumentation_name: String,
    pub instrumentation_version: String,
    /// `telemetry.sdk.language` resource attribute.
    #[serde(rename = "service_type")]
    pub sdk_language: String,
    /// `telemetry.sdk.name` resource attribute.
    #[serde(rename = "log_sub_type")]
    pub sdk_name: String,
    pub host_ip: String,
    pub host_name: String,
    pub host_port: i64,
    pub thread_id: i64,
    pub thread_name: String,
    #[serde(rename = "type")]
    pub db_system: String,
    pub db_statement: String,
    pub db_name: String,
    #[serde(rename = "connection_string")]
    pub db_connection_string: String,
    #[serde(rename = "url")]
    pub http_url: String,
    pub http_method: String,
    pub http_status_code: i64,
    #[serde(rename = "root")]
    pub is_root: bool,
    #[serde(rename = "error")]
    pub has_error: bool,
    #[serde(rename = "custom_param")]
    pub custom_params: Vec<CustomParam>,

    // Retained for inspection; the ingestion schema above is fixed, so none
    // of these reach the wire.
    #[serde(skip_serializing)]
    pub resource_attributes: AttrMap,
    #[serde(skip_serializing)]
    pub span_attributes: AttrMap,
    #[serde(skip_serializing)]
    pub trace_state: String,
    #[serde(skip_serializing)]
    pub events: Vec<FlatSpanEvent>,
    #[serde(skip_serializing)]
    pub links: Vec<FlatSpanLink>,
    #[serde(skip_serializing)]
    pub status_code: String,
    #[serde(skip_serializing)]
    pub status_message: String,
    #[serde(skip_serializing)]
    pub dropped_attributes_count: u32,
    #[serde(skip_serializing)]
    pub dropped_events_count: u32,
    #[serde(skip_serializing)]
    pub dropped_links_count: u32,
}

/// Denormalized log record.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FlatLog {
    #[serde(rename = "TraceId")]
    pub trace_id: String,
    #[serde(rename = "SpanId")]
    pub span_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "_zl_timestamp")]
    pub timestamp: i64,
    #[serde(rename = "s247agentuid")]
    pub agent_uid: String,
    pub name: String,
    #[serde(rename = "LogLevel")]
    pub log_level: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "attributes")]
    pub log_attributes: AttrMap,
    #[serde(rename = "ResourceAttributes")]
    pub resource_attributes: AttrMap,
    #[serde(rename = "DroppedAttributesCount")]
    pub dropped_attributes_count: u32,
    #[serde(rename = "TraceFlag")]
    pub flags: u32,
}
