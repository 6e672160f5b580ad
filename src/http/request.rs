use bytes::Bytes;

/// HTTP request methods.
///
/// Only the methods the server actually answers are representable. Anything
/// else is rejected by the parser with 405 Method Not Allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// TRACE - Echo the request back to the client
    TRACE,
}

impl Method {
    /// Parses an HTTP method from a string, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("head"), Some(Method::HEAD));
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("GET") {
            Some(Method::GET)
        } else if s.eq_ignore_ascii_case("HEAD") {
            Some(Method::HEAD)
        } else if s.eq_ignore_ascii_case("TRACE") {
            Some(Method::TRACE)
        } else {
            None
        }
    }

    /// Canonical uppercase name, as written to the access log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::TRACE => "TRACE",
        }
    }

    /// Whether the response body must be suppressed.
    pub fn is_head(&self) -> bool {
        matches!(self, Method::HEAD)
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Built once from the first read on a connection and never modified.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target, still percent-encoded (e.g. "/a%20b.txt")
    pub target: String,
    /// Value of the Host header
    pub host: String,
    /// Every byte read off the socket, echoed verbatim by TRACE
    pub raw: Bytes,
}
