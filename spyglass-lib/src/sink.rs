//! Pluggable persistence for observed fingerprints.
//!
//! Consumed after fingerprint computation; a failing sink is logged and
//! never affects the connection.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;

use crate::error::{Result, ServerError};
use crate::server::response::Response;

pub trait FingerprintSink: Send + Sync {
    fn record(&self, response: &Response);
}

/// Default sink: discard.
#[derive(Debug, Default)]
pub struct NoopSink;

impl FingerprintSink for NoopSink {
    fn record(&self, _response: &Response) {}
}

/// Appends one JSON document per observed connection.
#[derive(Debug)]
pub struct JsonlSink {
    file: Mutex<File>,
}

impl JsonlSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|e| ServerError::Config(format!("failed to open sink file: {e}")))?;
        Ok(JsonlSink {
            file: Mutex::new(file),
        })
    }
}

impl FingerprintSink for JsonlSink {
    fn record(&self, response: &Response) {
        let line = match serde_json::to_string(response) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialise fingerprint record");
                return;
            }
        };
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(e) = writeln!(file, "{line}") {
            warn!(error = %e, "failed to write fingerprint record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prints.jsonl");
        let sink = JsonlSink::open(&path).unwrap();

        sink.record(&Response::default());
        sink.record(&Response::default());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        let parsed: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert!(parsed.get("tls").is_some());
    }
}
