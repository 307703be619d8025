//! Projection of hierarchical trace batches into flat span records

use std::collections::HashMap;

use crate::attributes::{AttrMap, AttrValue, i64_attr, keys, str_attr};
use crate::record::{CustomParam, FlatSpan, FlatSpanEvent, FlatSpanLink};
use crate::telemetry::{InstrumentationScope, Span, StatusCode, TraceData};

/// Resource- and scope-level context shared by every span beneath them.
///
/// Resolved once per scope group so the per-span projection does not rescan
/// the resource attributes.
pub struct ResourceScope<'a> {
    pub resource: &'a AttrMap,
    pub scope: &'a InstrumentationScope,
    pub service_name: String,
    pub sdk_language: String,
    pub sdk_name: String,
}

impl<'a> ResourceScope<'a> {
    pub fn new(resource: &'a AttrMap, scope: &'a InstrumentationScope) -> Self {
        Self {
            service_name: str_attr(resource, keys::SERVICE_NAME),
            sdk_language: str_attr(resource, keys::TELEMETRY_SDK_LANGUAGE),
            sdk_name: str_attr(resource, keys::TELEMETRY_SDK_NAME),
            resource,
            scope,
        }
    }
}

/// First pass over a batch: map each trace id to the name of its root span.
///
/// A root is any span without a parent. If a batch carries several roots for
/// one trace, the last in batch order wins.
pub fn collect_root_span_names(traces: &TraceData) -> HashMap<String, String> {
    let mut roots = HashMap::new();
    for resource_spans in &traces.resource_spans {
        for scope_spans in &resource_spans.scopes {
            for span in &scope_spans.spans {
                if span.is_root() {
                    roots.insert(span.trace_id.clone(), span.name.clone());
                }
            }
        }
    }
    roots
}

/// Project one span into the flat vendor schema.
pub fn project_span(
    span: &Span,
    context: &ResourceScope<'_>,
    roots: &HashMap<String, String>,
) -> FlatSpan {
    let (exception_messages, exception_stack_traces, exception_types) = collect_exceptions(span);

    let events = span
        .events
        .iter()
        .map(|event| FlatSpanEvent {
            timestamp: event.time_unix_nano / 1_000_000,
            name: event.name.clone(),
            attributes: event.attributes.clone(),
        })
        .collect();

    let links = span
        .links
        .iter()
        .map(|link| FlatSpanLink {
            span_id: link.span_id.clone(),
            trace_id: link.trace_id.clone(),
        })
        .collect();

    // Every span attribute travels as a custom param, including the ones
    // copied into named columns below.
    let custom_params = span
        .attributes
        .iter()
        .map(|(key, value)| CustomParam {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    FlatSpan {
        trace_id: span.trace_id.clone(),
        span_id: span.span_id.clone(),
        parent_span_id: span.parent_span_id.clone(),
        root_span_id: roots.get(&span.trace_id).cloned().unwrap_or_default(),
        name: span.name.clone(),
        kind: span.kind.to_string(),
        start_time: span.start_time_unix_nano,
        end_time: span.end_time_unix_nano,
        duration: (span.end_time_unix_nano - span.start_time_unix_nano) as f64 / 1_000_000.0,
        service_name: context.service_name.clone(),
        exception_messages,
        exception_stack_traces,
        exception_types,
        instrumentation_name: context.scope.name.clone(),
        instrumentation_version: context.scope.version.clone(),
        sdk_language: context.sdk_language.clone(),
        sdk_name: context.sdk_name.clone(),
        host_ip: str_attr(&span.attributes, keys::NET_PEER_IP),
        host_name: str_attr(&span.attributes, keys::NET_PEER_NAME),
        host_port: i64_attr(&span.attributes, keys::NET_PEER_PORT),
        thread_id: i64_attr(&span.attributes, keys::THREAD_ID),
        thread_name: str_attr(&span.attributes, keys::THREAD_NAME),
        db_system: str_attr(&span.attributes, keys::DB_SYSTEM),
        db_statement: str_attr(&span.attributes, keys::DB_STATEMENT),
        db_name: str_attr(&span.attributes, keys::DB_NAME),
        db_connection_string: str_attr(&span.attributes, keys::DB_CONNECTION_STRING),
        http_url: str_attr(&span.attributes, keys::HTTP_URL),
        http_method: str_attr(&span.attributes, keys::HTTP_METHOD),
        http_status_code: i64_attr(&span.attributes, keys::HTTP_STATUS_CODE),
        is_root: span.is_root(),
        has_error: span.status.code == StatusCode::Error,
        custom_params,
        resource_attributes: context.resource.clone(),
        span_attributes: span.attributes.clone(),
        trace_state: span.trace_state.clone(),
        events,
        links,
        status_code: span.status.code.to_string(),
        status_message: span.status.message.clone(),
        dropped_attributes_count: span.dropped_attributes_count,
        dropped_events_count: span.dropped_events_count,
        dropped_links_count: span.dropped_links_count,
    }
}

/// Flatten a whole trace batch, preserving its span order. Root names are
/// resolved across the full batch before any span is projected.
pub fn flatten_traces(traces: &TraceData) -> Vec<FlatSpan> {
    let roots = collect_root_span_names(traces);
    let mut records = Vec::with_capacity(traces.span_count());
    for resource_spans in &traces.resource_spans {
        for scope_spans in &resource_spans.scopes {
            let context = ResourceScope::new(&resource_spans.resource, &scope_spans.scope);
            for span in &scope_spans.spans {
                records.push(project_span(span, &context, &roots));
            }
        }
    }
    records
}

/// Gather exception details from the span's events. Every event is checked
/// regardless of its name; each attribute is collected independently, so an
/// event missing (or mistyping) one of them still contributes the others.
fn collect_exceptions(span: &Span) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut messages = Vec::new();
    let mut stack_traces = Vec::new();
    let mut types = Vec::new();

    for event in &span.events {
        if let Some(message) = event
            .attributes
            .get(keys::EXCEPTION_MESSAGE)
            .and_then(AttrValue::as_str)
        {
            messages.push(message.to_string());
        }
        if let Some(stack_trace) = event
            .attributes
            .get(keys::EXCEPTION_STACKTRACE)
            .and_then(AttrValue::as_str)
        {
            stack_traces.push(stack_trace.to_string());
        }
        if let Some(class) = event
            .attributes
            .get(keys::EXCEPTION_TYPE)
            .and_then(AttrValue::as_str)
        {
            types.push(class.to_string());
        }
    }

    (messages, stack_traces, types)
}
