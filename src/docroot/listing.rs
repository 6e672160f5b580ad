//! Directory responses.
//!
//! A directory is answered with its first openable index file, or else with
//! a generated HTML table of its entries. Entries appear in whatever order
//! the filesystem enumerates them.

use std::fmt::Write as _;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone};
use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::http::error::ServeError;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Index files tried, in order, before falling back to a listing.
pub const INDEX_FILES: [&str; 3] = ["index.html", "index.htm", "default.htm"];

const SIZE_UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// One row of a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntryRow {
    pub name: String,
    pub is_dir: bool,
    pub modified: DateTime<Local>,
    pub size: u64,
}

impl DirEntryRow {
    /// Last-modified time as `YYYY-MM-DD HH:MM`, local time.
    pub fn format_modified(&self) -> String {
        self.modified.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn format_size(&self) -> String {
        if self.is_dir {
            "[DIR]".to_string()
        } else {
            format_size(self.size)
        }
    }
}

/// Converts a filesystem timestamp to local time, or `None` when it lies
/// outside the range chrono can represent.
pub fn local_time(time: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (-secs, 0),
                n => (-secs - 1, 1_000_000_000 - n),
            }
        }
    };

    Local.timestamp_opt(secs, nanos).single()
}

/// Formats a byte count in base-1024 units.
///
/// ```
/// # use lantern::docroot::listing::format_size;
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 kB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.1} {}", SIZE_UNITS[unit])
}

/// Answers a directory request.
pub async fn serve_directory<S>(
    writer: &mut ResponseWriter<'_, S>,
    dir: &Path,
    base_path: &str,
    display_path: &str,
    head_only: bool,
) -> Result<(), ServeError>
where
    S: AsyncWrite + Unpin,
{
    if let Some(mut index) = open_index(dir).await {
        writer.write_head(StatusCode::Ok, "text/html").await?;
        if !head_only {
            writer.stream_body(&mut index).await?;
        }
        return Ok(());
    }

    writer.write_head(StatusCode::Ok, "text/html").await?;

    if !head_only {
        let rows = match read_rows(dir).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "could not enumerate directory");
                Vec::new()
            }
        };
        let page = render_listing(base_path, display_path, &rows);
        writer.write_body(page.as_bytes()).await?;
    }

    Ok(())
}

async fn open_index(dir: &Path) -> Option<File> {
    for name in INDEX_FILES {
        let Ok(file) = File::open(dir.join(name)).await else {
            continue;
        };

        // a directory called index.html opens fine on unix but cannot be read
        match file.metadata().await {
            Ok(meta) if meta.is_file() => return Some(file),
            _ => continue,
        }
    }

    None
}

/// Enumerates `dir`, skipping `.`/`..`, entries whose metadata cannot be read
/// or whose mtime is out of range, and anything that is neither a file nor a
/// directory. Symlinks are followed.
pub async fn read_rows(dir: &Path) -> std::io::Result<Vec<DirEntryRow>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut rows = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }

        let meta = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(entry = %name, error = %e, "skipping entry");
                continue;
            }
        };

        if !meta.is_file() && !meta.is_dir() {
            continue;
        }

        let mtime = meta.modified().unwrap_or(UNIX_EPOCH);
        let Some(modified) = local_time(mtime) else {
            tracing::debug!(entry = %name, ?mtime, "skipping entry with unrepresentable mtime");
            continue;
        };

        rows.push(DirEntryRow {
            name,
            is_dir: meta.is_dir(),
            modified,
            size: meta.len(),
        });
    }

    Ok(rows)
}

/// Renders the listing page.
pub fn render_listing(base_path: &str, display_path: &str, rows: &[DirEntryRow]) -> String {
    let mut page = format!(
        "<!DOCTYPE html>\r\n\
         <html>\r\n \
         <head>\r\n  \
         <meta charset='utf-8'>\r\n  \
         <title>Directory Listing</title>\r\n  \
         <base href='{base}'>\r\n  \
         <style>\r\n   \
         td{{padding: 0 20px 0 0;}}\r\n  \
         </style>\r\n \
         </head>\r\n \
         <body>\r\n  \
         <h1>Directory listing for {display}</h1>\r\n  \
         <table>\r\n",
        base = html_escape(base_path),
        display = html_escape(display_path),
    );

    for row in rows {
        let name = html_escape(&row.name);
        let _ = write!(
            page,
            "   <tr><td><a href=\"{href}\">{name}{slash}</a></td><td>{modified}</td><td>{size}</td></tr>\r\n",
            href = html_escape(&href_encode(&row.name)),
            slash = if row.is_dir { "/" } else { "" },
            modified = row.format_modified(),
            size = row.format_size(),
        );
    }

    if rows.is_empty() {
        page.push_str("   <tr><td>No files found</td></tr>\r\n");
    }

    page.push_str("  </table>\r\n </body>\r\n</html>\r\n");
    page
}

/// Escapes the characters that would change how a relative href resolves or
/// decodes. `+` is included because the request decoder reads it as a space.
///
/// ```
/// # use lantern::docroot::listing::href_encode;
/// assert_eq!(href_encode("50% off #1?.txt"), "50%25%20off%20%231%3F.txt");
/// ```
pub fn href_encode(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '+' => out.push_str("%2B"),
            c => out.push(c),
        }
    }
    out
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
