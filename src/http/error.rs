//! Request-scoped error taxonomy.
//!
//! Every failure a single request can hit maps to exactly one status code.
//! None of them are fatal: the connection is answered, logged and closed,
//! and the worker moves on to its next accept.

use thiserror::Error;

use crate::http::response::StatusCode;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request line")]
    Malformed,

    #[error("no Host header provided")]
    MissingHost,

    #[error("malformed percent-escape in request target")]
    DecodeError,

    #[error("request path contains `..`")]
    PathTraversal,

    #[error("requested file has no extension")]
    NoExtension,

    #[error("method not supported")]
    UnsupportedMethod,

    #[error("no content type registered for `.{0}`")]
    UnsupportedType(String),

    #[error("resource not found")]
    NotFound,

    #[error("failed to open resource: {0}")]
    OpenError(#[source] std::io::Error),

    #[error("resource is neither a regular file nor a directory")]
    InvalidResourceKind,
}

impl RequestError {
    /// Status the error responder answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Malformed
            | RequestError::MissingHost
            | RequestError::DecodeError
            | RequestError::PathTraversal
            | RequestError::NoExtension
            | RequestError::InvalidResourceKind => StatusCode::BadRequest,
            RequestError::NotFound => StatusCode::NotFound,
            RequestError::UnsupportedMethod => StatusCode::MethodNotAllowed,
            RequestError::UnsupportedType(_) => StatusCode::UnsupportedMediaType,
            RequestError::OpenError(_) => StatusCode::InternalServerError,
        }
    }
}

/// Outcome of a handler that may already have put bytes on the wire.
///
/// `Rejected` means nothing was written yet and the caller should answer
/// with the error responder. `Io` means the head went out and the socket
/// failed afterwards, so no second head may be written.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Rejected(#[from] RequestError),

    #[error("socket write failed: {0}")]
    Io(#[from] std::io::Error),
}
