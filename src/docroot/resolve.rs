use std::path::{Path, PathBuf};

use crate::docroot::decode::percent_decode;
use crate::docroot::file::content_type_for;
use crate::http::error::RequestError;
use crate::http::mime::MimeRegistry;

/// What a request target points at inside the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// A regular file with a registered content type
    File { path: PathBuf, content_type: String },
    /// A directory; `base_path` is the target with a trailing `/`
    Directory { path: PathBuf, base_path: String },
}

/// Turns a percent-encoded target into a classified path under `root`.
///
/// Any `..` in the decoded path is rejected outright, even when it is part
/// of a file name and would not leave the root.
pub async fn resolve(
    target: &str,
    root: &Path,
    mimes: &MimeRegistry,
) -> Result<Resource, RequestError> {
    let decoded = percent_decode(target)?;

    if decoded.contains("..") {
        return Err(RequestError::PathTraversal);
    }

    let path = root.join(decoded.trim_start_matches('/'));

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| RequestError::NotFound)?;

    if metadata.is_dir() {
        let mut base_path = target.to_string();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Ok(Resource::Directory { path, base_path })
    } else if metadata.is_file() {
        let content_type = content_type_for(&path, mimes)?;
        Ok(Resource::File { path, content_type })
    } else {
        Err(RequestError::InvalidResourceKind)
    }
}
