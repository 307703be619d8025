//! Local archive of payload activity and endpoint responses

use crate::errors::Result;
use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only file mirroring what the exporter sent and heard back.
///
/// Writes are strictly best-effort: once the file is open, a failed write is
/// logged and swallowed so exports never fail on local disk problems.
#[derive(Debug)]
pub struct DebugSink {
    path: String,
    file: Option<File>,
}

impl DebugSink {
    /// Create a sink for `path`. Nothing is opened until [`DebugSink::open`].
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Open the archive file, truncating any previous run's content. An
    /// empty path leaves the sink disabled.
    pub async fn open(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await?;
        self.file = Some(file);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one timestamped line. Failures are logged, never returned.
    pub async fn write_line(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let entry = format!("{} {}\n", Utc::now().to_rfc3339(), line);
        if let Err(e) = file.write_all(entry.as_bytes()).await {
            warn!("Failed to write to debug archive {}: {}", self.path, e);
        }
    }

    /// Append raw content, used to archive endpoint response bodies.
    pub async fn write_raw(&mut self, content: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        if let Err(e) = file.write_all(content.as_bytes()).await {
            warn!("Failed to write to debug archive {}: {}", self.path, e);
        }
    }

    /// Flush and release the file handle.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_are_timestamped_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.log");

        let mut sink = DebugSink::new(path.to_str().unwrap());
        sink.open().await.unwrap();
        assert!(sink.is_enabled());

        sink.write_line("Exporter started").await;
        sink.write_line("Uploaded 3 spans").await;
        sink.write_raw("response-body").await;
        sink.close().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("Exporter started"));
        assert!(lines[1].ends_with("Uploaded 3 spans"));
        // Raw content gets no timestamp prefix.
        assert_eq!(lines[2], "response-body");
        // Timestamp prefix parses back as RFC 3339.
        let (timestamp, _) = lines[0].split_once(' ').unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_empty_path_disables_the_sink() {
        let mut sink = DebugSink::new("");
        sink.open().await.unwrap();
        assert!(!sink.is_enabled());

        // No-ops rather than errors.
        sink.write_line("dropped").await;
        sink.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.log");

        let mut sink = DebugSink::new(path.to_str().unwrap());
        sink.open().await.unwrap();
        sink.write_line("first run").await;
        sink.close().await.unwrap();

        let mut sink = DebugSink::new(path.to_str().unwrap());
        sink.open().await.unwrap();
        sink.close().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_path_fails_open() {
        let mut sink = DebugSink::new("/nonexistent-dir/archive.log");
        assert!(sink.open().await.is_err());
        assert!(!sink.is_enabled());
    }
}
