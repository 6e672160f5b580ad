use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::http::error::{RequestError, ServeError};
use crate::http::mime::MimeRegistry;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Resolves the content type of a regular file from its extension.
///
/// The extension is whatever follows the last `.` of the file name.
pub fn content_type_for(path: &Path, mimes: &MimeRegistry) -> Result<String, RequestError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(RequestError::NoExtension)?;

    let ext = match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => return Err(RequestError::NoExtension),
    };

    mimes
        .lookup(ext)
        .map(str::to_string)
        .ok_or_else(|| RequestError::UnsupportedType(ext.to_ascii_lowercase()))
}

/// Serves a regular file. It is opened before anything is written, so an
/// open failure can still be answered with a 500.
pub async fn serve_file<S>(
    writer: &mut ResponseWriter<'_, S>,
    path: &Path,
    content_type: &str,
    head_only: bool,
) -> Result<(), ServeError>
where
    S: AsyncWrite + Unpin,
{
    let mut file = File::open(path).await.map_err(RequestError::OpenError)?;

    writer.write_head(StatusCode::Ok, content_type).await?;

    if !head_only {
        let sent = writer.stream_body(&mut file).await?;
        tracing::debug!(path = %path.display(), bytes = sent, "file streamed");
    }

    Ok(())
}
