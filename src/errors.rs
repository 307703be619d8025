//! Error types for the exporter

use std::fmt;

pub type Result<T> = std::result::Result<T, ExporterError>;

#[derive(Debug)]
pub enum ExporterError {
    /// IO operation failed (debug sink, payload compression)
    Io(std::io::Error),

    /// HTTP request failed or the response could not be read
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for ExporterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExporterError::Io(err) => write!(f, "IO error: {}", err),
            ExporterError::Http(err) => write!(f, "HTTP error: {}", err),
            ExporterError::Json(err) => write!(f, "JSON error: {}", err),
            ExporterError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ExporterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExporterError::Io(err) => Some(err),
            ExporterError::Http(err) => Some(err),
            ExporterError::Json(err) => Some(err),
            ExporterError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err)
    }
}

impl From<reqwest::Error> for ExporterError {
    fn from(err: reqwest::Error) -> Self {
        ExporterError::Http(err)
    }
}

impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Json(err)
    }
}
