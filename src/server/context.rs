use std::path::PathBuf;
use std::time::Duration;

use crate::access_log::AccessLog;
use crate::http::mime::MimeRegistry;

/// Read-only state shared by every worker for the life of the process.
pub struct ServerContext {
    /// Document root all targets resolve under
    pub root: PathBuf,
    /// Extension to content-type table
    pub mimes: MimeRegistry,
    /// Append-only request log
    pub access_log: AccessLog,
    /// How long to wait for request bytes; `None` waits forever
    pub read_timeout: Option<Duration>,
}

impl ServerContext {
    pub fn new(root: impl Into<PathBuf>, mimes: MimeRegistry, access_log: AccessLog) -> Self {
        Self {
            root: root.into(),
            mimes,
            access_log,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}
