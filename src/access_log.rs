//! Access log sink.
//!
//! One line per request attempt, plus `[ INFO ]` lines for lifecycle events.
//! Workers share a single sink; each line is formatted up front and written
//! under the lock so records from different connections never interleave.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Local;

/// One completed (or failed) request, as it appears in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub method: String,
    pub host: String,
    pub resource: String,
    pub status: u16,
}

pub struct AccessLog {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl AccessLog {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Opens `path` for writing, truncating any previous log.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    /// In-memory log, returned together with a handle to read it back.
    pub fn memory() -> (Self, MemorySink) {
        let sink = MemorySink::default();
        (Self::new(sink.clone()), sink)
    }

    pub fn record(&self, record: &AccessRecord) {
        let line = format!(
            "[ {} ] {} {} {} {}\r\n",
            timestamp(),
            record.method,
            record.host,
            record.resource,
            record.status
        );
        self.append(&line);
    }

    pub fn message(&self, message: &str) {
        let line = format!("[ {} ] [ INFO ] {} \r\n", timestamp(), message);
        self.append(&line);
    }

    fn append(&self, line: &str) {
        // a writer that panicked mid-line leaves at worst a torn line behind
        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("access log lock poisoned, continuing");
            poisoned.into_inner()
        });

        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|()| sink.flush()) {
            tracing::error!(error = %e, "failed to write access log");
        }
    }
}

/// Local time with a numeric UTC offset (`+0200`). chrono has no zone
/// abbreviations, so the offset stands in for strftime's `%Z`.
fn timestamp() -> String {
    Local::now().format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// Shared byte buffer implementing `Write`, used to inspect the log in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
