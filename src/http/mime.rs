//! MIME type registry.
//!
//! Maps a lowercase file extension (no leading dot) to a content type. The
//! registry is built once at startup, either from the default table or from
//! a `<ext> <content-type>` file, and is read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
];

#[derive(Debug, Clone)]
pub struct MimeRegistry {
    types: HashMap<String, String>,
}

impl Default for MimeRegistry {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_TYPES.iter().copied())
    }
}

impl MimeRegistry {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let types = pairs
            .into_iter()
            .map(|(ext, content_type)| (normalize(ext), content_type.to_string()))
            .collect();
        Self { types }
    }

    /// Parses a MIME table, one `<extension> <content-type>` entry per line.
    ///
    /// The result replaces the defaults entirely. Blank lines and lines with no
    /// content type are skipped; a repeated extension keeps the last entry.
    pub fn parse(text: &str) -> Self {
        let mut types = HashMap::new();

        for line in text.lines() {
            let line = line.trim();
            let Some((ext, content_type)) = line.split_once(char::is_whitespace) else {
                continue;
            };

            let content_type = content_type.trim();
            if ext.is_empty() || content_type.is_empty() {
                continue;
            }

            types.insert(normalize(ext), content_type.to_string());
        }

        Self { types }
    }

    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Looks up the content type for an extension, ignoring case.
    pub fn lookup(&self, ext: &str) -> Option<&str> {
        self.types.get(&normalize(ext)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
