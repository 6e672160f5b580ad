use bytes::Bytes;
use thiserror::Error;

use crate::http::error::RequestError;
use crate::http::request::{Method, Request};

/// Host value logged when a request carries no Host header.
pub const NO_HOST: &str = "NO HOST PROVIDED";

/// Why a request could not be parsed.
///
/// Each variant keeps the request-line tokens seen so far so the access log
/// can still describe the attempt.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request line")]
    EmptyRequest,

    #[error("no Host header")]
    MissingHost { method: String, target: String },

    #[error("unsupported method `{method}`")]
    UnsupportedMethod {
        method: String,
        target: String,
        host: String,
    },

    #[error("invalid request target `{target}`")]
    InvalidTarget {
        method: String,
        target: String,
        host: String,
    },
}

impl ParseError {
    /// Method token as the client sent it, or `-` when there was none.
    pub fn method(&self) -> &str {
        match self {
            ParseError::EmptyRequest => "-",
            ParseError::MissingHost { method, .. }
            | ParseError::UnsupportedMethod { method, .. }
            | ParseError::InvalidTarget { method, .. } => method,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            ParseError::EmptyRequest | ParseError::MissingHost { .. } => NO_HOST,
            ParseError::UnsupportedMethod { host, .. } | ParseError::InvalidTarget { host, .. } => {
                host
            }
        }
    }

    /// Resource field for the access log. Empty when the host was missing.
    pub fn resource(&self) -> &str {
        match self {
            ParseError::EmptyRequest | ParseError::MissingHost { .. } => "",
            ParseError::UnsupportedMethod { target, .. }
            | ParseError::InvalidTarget { target, .. } => target,
        }
    }

    /// Whether the client asked for HEAD, so the error body is suppressed.
    pub fn head_only(&self) -> bool {
        self.method().eq_ignore_ascii_case("HEAD")
    }

    pub fn to_request_error(&self) -> RequestError {
        match self {
            ParseError::EmptyRequest | ParseError::InvalidTarget { .. } => RequestError::Malformed,
            ParseError::MissingHost { .. } => RequestError::MissingHost,
            ParseError::UnsupportedMethod { .. } => RequestError::UnsupportedMethod,
        }
    }
}

#[derive(Clone, Copy)]
enum HeaderState {
    Headers,
    Done,
}

/// Parses the request line and the Host header out of one read's worth of
/// bytes.
///
/// Headers may arrive in any order; scanning stops at the first blank line
/// or at the end of the buffer. Everything other than Host is ignored.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let text = String::from_utf8_lossy(buf);
    let mut lines = text.split('\n').map(|line| line.trim_end_matches('\r'));

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::EmptyRequest)?;
    // any version token is accepted and ignored
    let target = parts.next().unwrap_or_default();

    // Headers
    let mut host = None;
    let mut state = HeaderState::Headers;

    for line in lines {
        match state {
            HeaderState::Headers if line.trim().is_empty() => state = HeaderState::Done,
            HeaderState::Headers => {
                if host.is_none() {
                    host = host_value(line);
                }
            }
            HeaderState::Done => break,
        }
    }

    let Some(host) = host else {
        return Err(ParseError::MissingHost {
            method: method_str.to_string(),
            target: target.to_string(),
        });
    };

    let Some(method) = Method::from_str(method_str) else {
        return Err(ParseError::UnsupportedMethod {
            method: method_str.to_string(),
            target: target.to_string(),
            host,
        });
    };

    if !target.starts_with('/') {
        return Err(ParseError::InvalidTarget {
            method: method_str.to_string(),
            target: target.to_string(),
            host,
        });
    }

    Ok(Request {
        method,
        target: target.to_string(),
        host,
        raw: Bytes::copy_from_slice(buf),
    })
}

/// Extracts the host token from a `Host: <name>` line, if this is one.
fn host_value(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;

    let value = if first.eq_ignore_ascii_case("host:") {
        tokens.next()?
    } else {
        let (name, rest) = first.split_once(':')?;
        if !name.eq_ignore_ascii_case("host") || rest.is_empty() {
            return None;
        }
        rest
    };

    Some(value.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request(req).unwrap();

        assert_eq!(parsed.method, Method::GET);
        assert_eq!(parsed.target, "/");
        assert_eq!(parsed.host, "example.com");
        assert_eq!(&parsed.raw[..], &req[..]);
    }

    #[test]
    fn host_value_accepts_glued_form() {
        assert_eq!(host_value("Host:example.com").as_deref(), Some("example.com"));
        assert_eq!(host_value("HOST:   a.b").as_deref(), Some("a.b"));
        assert_eq!(host_value("Hostile: x"), None);
        assert_eq!(host_value("Host:"), None);
    }
}
