//! Projection of hierarchical log batches into flat log records

use crate::attributes::{AttrMap, AttrValue, keys};
use crate::record::{AGENT_UID, FlatLog};
use crate::telemetry::{LogBody, LogData, LogRecord};

/// Project one log record, with its resource context, into the flat vendor
/// schema.
pub fn project_log(record: &LogRecord, resource: &AttrMap) -> FlatLog {
    let (trace_id, span_id) = correlation_ids(record);

    FlatLog {
        trace_id,
        span_id,
        timestamp: record.time_unix_nano / 1_000_000,
        agent_uid: AGENT_UID.to_string(),
        name: record.name.clone(),
        log_level: record.severity_text.clone(),
        message: body_message(record),
        log_attributes: record.attributes.clone(),
        resource_attributes: resource.clone(),
        dropped_attributes_count: record.dropped_attributes_count,
        flags: record.flags,
    }
}

/// Flatten a whole log batch, preserving its record order.
pub fn flatten_logs(logs: &LogData) -> Vec<FlatLog> {
    let mut records = Vec::with_capacity(logs.log_record_count());
    for resource_logs in &logs.resource_logs {
        for scope_logs in &resource_logs.scopes {
            for record in &scope_logs.records {
                records.push(project_log(record, &resource_logs.resource));
            }
        }
    }
    records
}

/// The delivered message: a text body verbatim, a map body's `msg` entry,
/// or the record's name when neither is usable.
fn body_message(record: &LogRecord) -> String {
    match &record.body {
        Some(LogBody::Text(text)) => text.clone(),
        Some(LogBody::Map(map)) => map
            .get(keys::BODY_MSG)
            .and_then(AttrValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| record.name.clone()),
        None => record.name.clone(),
    }
}

/// Correlation ids for the record. Ids embedded in a structured body win
/// when present and non-empty; otherwise the record's own ids are kept.
fn correlation_ids(record: &LogRecord) -> (String, String) {
    let mut trace_id = record.trace_id.clone();
    let mut span_id = record.span_id.clone();

    if let Some(LogBody::Map(map)) = &record.body {
        if let Some(id) = nonempty_str(map, keys::BODY_TRACE_ID) {
            trace_id = id;
        }
        if let Some(id) = nonempty_str(map, keys::BODY_SPAN_ID) {
            span_id = id;
        }
    }

    (trace_id, span_id)
}

fn nonempty_str(map: &AttrMap, key: &str) -> Option<String> {
    map.get(key)
        .and_then(AttrValue::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{InstrumentationScope, ResourceLogs, ScopeLogs};

    fn batch(resource: AttrMap, records: Vec<LogRecord>) -> LogData {
        let mut scope_logs = ScopeLogs::new(InstrumentationScope::new("app-logger", "1.0"));
        scope_logs.records = records;
        LogData::new().with_resource(ResourceLogs::new(resource).with_scope(scope_logs))
    }

    #[test]
    fn test_text_body_becomes_message() {
        let record = LogRecord::new("app-log")
            .with_ids("trace-1", "span-1")
            .with_timestamp(1_700_000_000_123_000_000)
            .with_severity("WARN")
            .with_body_text("disk almost full");

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].message, "disk almost full");
        assert_eq!(flat[0].log_level, "WARN");
        assert_eq!(flat[0].trace_id, "trace-1");
        assert_eq!(flat[0].span_id, "span-1");
        assert_eq!(flat[0].timestamp, 1_700_000_000_123);
        assert_eq!(flat[0].agent_uid, AGENT_UID);
    }

    #[test]
    fn test_structured_body_supplies_message_and_ids() {
        let mut body = AttrMap::new();
        body.insert(keys::BODY_MSG.to_string(), AttrValue::from("payment failed"));
        body.insert(keys::BODY_TRACE_ID.to_string(), AttrValue::from("trace-7"));
        body.insert(keys::BODY_SPAN_ID.to_string(), AttrValue::from("span-7"));

        let record = LogRecord::new("payment")
            .with_severity("ERROR")
            .with_body_map(body);

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat[0].message, "payment failed");
        assert_eq!(flat[0].trace_id, "trace-7");
        assert_eq!(flat[0].span_id, "span-7");
        assert_eq!(flat[0].log_level, "ERROR");
    }

    #[test]
    fn test_body_ids_override_record_ids() {
        let mut body = AttrMap::new();
        body.insert(keys::BODY_MSG.to_string(), AttrValue::from("boom"));
        body.insert(keys::BODY_TRACE_ID.to_string(), AttrValue::from("body-trace"));
        body.insert(keys::BODY_SPAN_ID.to_string(), AttrValue::from("body-span"));

        let record = LogRecord::new("app-log")
            .with_ids("trace-1", "span-1")
            .with_body_map(body);

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat[0].message, "boom");
        assert_eq!(flat[0].trace_id, "body-trace");
        assert_eq!(flat[0].span_id, "body-span");
    }

    #[test]
    fn test_unusable_body_entries_fall_back() {
        let mut body = AttrMap::new();
        // Wrong type for msg, empty trace id, mistyped span id: none is taken.
        body.insert(keys::BODY_MSG.to_string(), AttrValue::from(13i64));
        body.insert(keys::BODY_TRACE_ID.to_string(), AttrValue::from(""));
        body.insert(keys::BODY_SPAN_ID.to_string(), AttrValue::from(7i64));

        let record = LogRecord::new("fallback-name")
            .with_ids("trace-1", "span-1")
            .with_body_map(body);

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat[0].message, "fallback-name");
        assert_eq!(flat[0].trace_id, "trace-1");
        assert_eq!(flat[0].span_id, "span-1");
    }

    #[test]
    fn test_missing_body_falls_back_to_name() {
        let record = LogRecord::new("heartbeat");

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat[0].message, "heartbeat");
        assert_eq!(flat[0].name, "heartbeat");
    }

    #[test]
    fn test_timestamp_truncates_to_millis() {
        let record = LogRecord::new("tick").with_timestamp(1_999_999);

        let flat = flatten_logs(&batch(AttrMap::new(), vec![record]));
        assert_eq!(flat[0].timestamp, 1);
    }

    #[test]
    fn test_resource_attributes_and_counts_carry_through() {
        let mut resource = AttrMap::new();
        resource.insert(keys::SERVICE_NAME.to_string(), AttrValue::from("billing"));

        let mut record = LogRecord::new("app-log")
            .with_attribute("request_id", "r-42")
            .with_flags(1);
        record.dropped_attributes_count = 3;

        let flat = flatten_logs(&batch(resource, vec![record]));
        assert_eq!(
            flat[0].resource_attributes.get(keys::SERVICE_NAME),
            Some(&AttrValue::from("billing"))
        );
        assert_eq!(
            flat[0].log_attributes.get("request_id"),
            Some(&AttrValue::from("r-42"))
        );
        assert_eq!(flat[0].dropped_attributes_count, 3);
        assert_eq!(flat[0].flags, 1);
    }

    #[test]
    fn test_batch_order_preserved_across_resources() {
        let logs = LogData::new()
            .with_resource(
                ResourceLogs::new(AttrMap::new()).with_scope(
                    ScopeLogs::new(InstrumentationScope::new("lib-a", "1"))
                        .with_record(LogRecord::new("one"))
                        .with_record(LogRecord::new("two")),
                ),
            )
            .with_resource(
                ResourceLogs::new(AttrMap::new()).with_scope(
                    ScopeLogs::new(InstrumentationScope::new("lib-b", "2"))
                        .with_record(LogRecord::new("three")),
                ),
            );

        let flat = flatten_logs(&logs);
        assert_eq!(flat.len(), logs.log_record_count());
        let names: Vec<&str> = flat.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }
}
