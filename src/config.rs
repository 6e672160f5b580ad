use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PREFORK: usize = 5;

/// Command-line and environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "lantern", version, about = "Minimal preforking HTTP/1.1 file server")]
pub struct Config {
    /// Port to listen on; invalid values fall back to 8000
    #[arg(short = 'p', long = "port", env = "LANTERN_PORT", default_value = "8000", allow_hyphen_values = true)]
    pub raw_port: String,

    /// Address to bind
    #[arg(long, env = "LANTERN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Document root; the process changes into it before serving
    #[arg(short = 'd', long, env = "LANTERN_DOCROOT")]
    pub docroot: Option<PathBuf>,

    /// Access log file, truncated at startup
    #[arg(short = 'l', long, env = "LANTERN_LOG", default_value = "httpd.log")]
    pub log_file: PathBuf,

    /// File of `<extension> <content-type>` lines replacing the default table
    #[arg(short = 'm', long, env = "LANTERN_MIME")]
    pub mime_file: Option<PathBuf>,

    /// Number of workers started in addition to the main accept loop
    #[arg(short = 'f', long, env = "LANTERN_PREFORK", default_value_t = DEFAULT_PREFORK)]
    pub prefork: usize,

    /// Seconds to wait for a request after accepting; 0 waits forever
    #[arg(long = "read-timeout", env = "LANTERN_READ_TIMEOUT", default_value_t = 30)]
    pub read_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Validated port. Anything that is not a number in 0..=65535 yields the
    /// default with a warning.
    pub fn port(&self) -> u16 {
        match self.raw_port.trim().parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!(
                    "Invalid port `{}` entered. Defaulting to port: {}",
                    self.raw_port,
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}
