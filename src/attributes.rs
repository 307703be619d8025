//! Dynamically-typed attribute maps and safe field coercion

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known attribute keys read during projection.
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
    pub const TELEMETRY_SDK_NAME: &str = "telemetry.sdk.name";
    pub const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";

    pub const NET_PEER_IP: &str = "net.peer.ip";
    pub const NET_PEER_NAME: &str = "net.peer.name";
    pub const NET_PEER_PORT: &str = "net.peer.port";

    pub const THREAD_ID: &str = "thread.id";
    pub const THREAD_NAME: &str = "thread.name";

    pub const DB_SYSTEM: &str = "db.system";
    pub const DB_STATEMENT: &str = "db.statement";
    pub const DB_NAME: &str = "db.name";
    pub const DB_CONNECTION_STRING: &str = "db.connection_string";

    pub const HTTP_URL: &str = "http.url";
    pub const HTTP_METHOD: &str = "http.method";
    pub const HTTP_STATUS_CODE: &str = "http.status_code";

    pub const EXCEPTION_MESSAGE: &str = "exception.message";
    pub const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";
    pub const EXCEPTION_TYPE: &str = "exception.type";

    pub const BODY_MSG: &str = "msg";
    pub const BODY_TRACE_ID: &str = "trace_id";
    pub const BODY_SPAN_ID: &str = "span_id";
}

/// Attribute mapping with a deterministic key order.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A single attribute value of dynamic type.
///
/// Serializes untagged, so attribute maps keep their natural JSON shape
/// (`{"thread.id": 7, "db.system": "postgres"}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Map(AttrMap),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttrValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(d: f64) -> Self {
        AttrValue::Double(d)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(b: Vec<u8>) -> Self {
        AttrValue::Bytes(b)
    }
}

/// Look up a string attribute, falling back to the empty string when the key
/// is absent or holds a non-string value.
pub fn str_attr(attrs: &AttrMap, key: &str) -> String {
    attrs
        .get(key)
        .and_then(AttrValue::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Look up an integer attribute, falling back to zero when the key is absent
/// or holds a non-integer value.
pub fn i64_attr(attrs: &AttrMap, key: &str) -> i64 {
    attrs.get(key).and_then(AttrValue::as_i64).unwrap_or_default()
}
