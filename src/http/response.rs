use chrono::Utc;

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): Resource served
/// - `BadRequest` (400): Malformed request, bad escape, traversal, no extension
/// - `NotFound` (404): Resource not found
/// - `MethodNotAllowed` (405): Method other than GET, HEAD or TRACE
/// - `UnsupportedMediaType` (415): Extension missing from the MIME registry
/// - `InternalServerError` (500): Resolved file could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::UnsupportedMediaType.as_u16(), 415);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::UnsupportedMediaType => 415,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Human-readable sentence placed in error bodies.
    pub fn message(&self) -> &'static str {
        match self {
            StatusCode::Ok => "The request was served",
            StatusCode::BadRequest => "The server could not process the request",
            StatusCode::NotFound => "The server could not locate the requested resource",
            StatusCode::MethodNotAllowed => "The server could not process the requested method",
            StatusCode::UnsupportedMediaType => "The requested resource is unsupported",
            StatusCode::InternalServerError => "The server encountered an internal error",
        }
    }
}

/// Status line plus the two headers every response carries.
///
/// There is no Content-Length: the server closes the connection after the
/// body, which delimits it.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// The HTTP status code
    pub status: StatusCode,
    /// Value of the Date header
    pub date: String,
    /// Value of the Content-Type header
    pub content_type: String,
}

impl ResponseHead {
    /// Creates a head stamped with the current time.
    pub fn new(status: StatusCode, content_type: impl Into<String>) -> Self {
        Self {
            status,
            date: http_date(),
            content_type: content_type.into(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nDate: {}\r\nContent-Type: {}\r\n\r\n",
            self.status.as_u16(),
            self.status.reason_phrase(),
            self.date,
            self.content_type,
        )
        .into_bytes()
    }
}

/// Current time in RFC 1123 form.
pub fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Fixed HTML body sent for every error status.
pub fn error_body(status: StatusCode) -> String {
    format!(
        "<!DOCTYPE HTML>\r\n\
         <html>\r\n \
         <head>\r\n  \
         <title>{code} {text}</title>\r\n \
         </head>\r\n \
         <body>\r\n  \
         <h1>{text}</h1>\r\n  \
         <p>{message}</p>\r\n \
         </body>\r\n\
         </html>\r\n",
        code = status.as_u16(),
        text = status.reason_phrase(),
        message = status.message(),
    )
}
