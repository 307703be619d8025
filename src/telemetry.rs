//! Hierarchical telemetry data structures and utilities
//!
//! The vendor-neutral input model handed over by the upstream pipeline:
//! resources own instrumentation scopes, scopes own spans or log records.

use crate::attributes::{AttrMap, AttrValue};
use serde::{Deserialize, Serialize};

/// A batch of trace telemetry grouped by resource and instrumentation scope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceData {
    pub resource_spans: Vec<ResourceSpans>,
}

/// A batch of log telemetry grouped by resource and instrumentation scope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogData {
    pub resource_logs: Vec<ResourceLogs>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceSpans {
    pub resource: AttrMap,
    pub scopes: Vec<ScopeSpans>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScopeSpans {
    pub scope: InstrumentationScope,
    pub spans: Vec<Span>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceLogs {
    pub resource: AttrMap,
    pub scopes: Vec<ScopeLogs>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScopeLogs {
    pub scope: InstrumentationScope,
    pub records: Vec<LogRecord>,
}

/// The library/module that produced a group of records.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: String,
}

/// A single timed operation within a distributed trace.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    /// Empty string means this span is the root of its trace.
    pub parent_span_id: String,
    pub name: String,
    pub kind: SpanKind,
    pub start_time_unix_nano: i64,
    pub end_time_unix_nano: i64,
    pub status: SpanStatus,
    pub attributes: AttrMap,
    pub events: Vec<SpanEvent>,
    pub links: Vec<SpanLink>,
    pub trace_state: String,
    pub dropped_attributes_count: u32,
    pub dropped_events_count: u32,
    pub dropped_links_count: u32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum SpanKind {
    #[default]
    Unspecified,
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::Unspecified => write!(f, "UNSPECIFIED"),
            SpanKind::Internal => write!(f, "INTERNAL"),
            SpanKind::Server => write!(f, "SERVER"),
            SpanKind::Client => write!(f, "CLIENT"),
            SpanKind::Producer => write!(f, "PRODUCER"),
            SpanKind::Consumer => write!(f, "CONSUMER"),
        }
    }
}

impl From<i32> for SpanKind {
    fn from(kind: i32) -> Self {
        match kind {
            1 => SpanKind::Internal,
            2 => SpanKind::Server,
            3 => SpanKind::Client,
            4 => SpanKind::Producer,
            5 => SpanKind::Consumer,
            _ => SpanKind::Unspecified, // Unset or unrecognized
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCode::Unset => write!(f, "STATUS_CODE_UNSET"),
            StatusCode::Ok => write!(f, "STATUS_CODE_OK"),
            StatusCode::Error => write!(f, "STATUS_CODE_ERROR"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpanStatus {
    pub code: StatusCode,
    pub message: String,
}

impl SpanStatus {
    pub fn ok() -> Self {
        Self {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Error,
            message: message.into(),
        }
    }
}

/// A timestamped event attached to a span.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpanEvent {
    pub time_unix_nano: i64,
    pub name: String,
    pub attributes: AttrMap,
}

/// A reference from one span to another, possibly in a different trace.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
}

/// A single log record with optional trace correlation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub trace_id: String,
    pub span_id: String,
    pub time_unix_nano: i64,
    pub severity_text: String,
    pub name: String,
    pub body: Option<LogBody>,
    pub attributes: AttrMap,
    pub flags: u32,
    pub dropped_attributes_count: u32,
}

/// A log record body: either free text or a structured key-value map.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogBody {
    Text(String),
    Map(AttrMap),
}

impl TraceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource_spans: ResourceSpans) -> Self {
        self.resource_spans.push(resource_spans);
        self
    }

    /// Number of spans across all resources and scopes.
    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.scopes.iter())
            .map(|ss| ss.spans.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.span_count() == 0
    }
}

impl LogData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource_logs: ResourceLogs) -> Self {
        self.resource_logs.push(resource_logs);
        self
    }

    /// Number of log records across all resources and scopes.
    pub fn log_record_count(&self) -> usize {
        self.resource_logs
            .iter()
            .flat_map(|rl| rl.scopes.iter())
            .map(|sl| sl.records.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.log_record_count() == 0
    }
}

impl ResourceSpans {
    pub fn new(resource: AttrMap) -> Self {
        Self {
            resource,
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeSpans) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl ScopeSpans {
    pub fn new(scope: InstrumentationScope) -> Self {
        Self {
            scope,
            spans: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

impl ResourceLogs {
    pub fn new(resource: AttrMap) -> Self {
        Self {
            resource,
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeLogs) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl ScopeLogs {
    pub fn new(scope: InstrumentationScope) -> Self {
        Self {
            scope,
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: LogRecord) -> Self {
        self.records.push(record);
        self
    }
}

impl InstrumentationScope {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Span {
    pub fn new(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the span has no parent and therefore starts its trace.
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_empty()
    }

    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = parent_span_id.into();
        self
    }

    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_times(mut self, start_unix_nano: i64, end_unix_nano: i64) -> Self {
        self.start_time_unix_nano = start_unix_nano;
        self.end_time_unix_nano = end_unix_nano;
        self
    }

    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_event(mut self, event: SpanEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_link(mut self, link: SpanLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_trace_state(mut self, trace_state: impl Into<String>) -> Self {
        self.trace_state = trace_state.into();
        self
    }
}

impl SpanEvent {
    pub fn new(time_unix_nano: i64, name: impl Into<String>) -> Self {
        Self {
            time_unix_nano,
            name: name.into(),
            attributes: AttrMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl LogRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_ids(mut self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self.span_id = span_id.into();
        self
    }

    pub fn with_timestamp(mut self, time_unix_nano: i64) -> Self {
        self.time_unix_nano = time_unix_nano;
        self
    }

    pub fn with_severity(mut self, severity_text: impl Into<String>) -> Self {
        self.severity_text = severity_text.into();
        self
    }

    pub fn with_body_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(LogBody::Text(body.into()));
        self
    }

    pub fn with_body_map(mut self, body: AttrMap) -> Self {
        self.body = Some(LogBody::Map(body));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}
