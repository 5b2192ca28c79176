//! Attachment metadata.
//!
//! An issue only records where attachment content lives; fetching or
//! rendering the bytes belongs to the caller.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use url::Url;

/// Metadata about one file attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attachment {
    /// Service-assigned id; empty until the attachment has been uploaded.
    #[serde(default)]
    pub id: String,
    /// Optional caption.
    #[serde(default)]
    pub subject: String,
    /// File name shown to the user and used for uniqueness checks.
    pub file_name: String,
    /// MIME content type (e.g. `"image/jpeg"`).
    #[serde(default)]
    pub content_type: String,
    /// Size in bytes, if known.
    #[serde(default)]
    pub content_length: Option<u64>,
    /// Location the content can be resolved from (`file:///…` or remote).
    #[serde(default)]
    pub url: String,
}

impl Attachment {
    /// Create an attachment with a file name and a content type derived from
    /// its extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            content_type,
            ..Self::default()
        }
    }

    /// Describe a local file as an attachment.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file metadata cannot be read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            content_length: Some(metadata.len()),
            url: file_url(path),
            ..Self::new(file_name)
        })
    }

    /// Size formatted for display, empty if unknown.
    #[must_use]
    pub fn size_label(&self) -> String {
        self.content_length.map(format_size).unwrap_or_default()
    }
}

/// Lower-case extension of `file_name` without the dot, or `""`.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|dot| file_name[dot + 1..].to_ascii_lowercase())
        .unwrap_or_default()
}

/// Guess a MIME type from the file name, `application/octet-stream` if
/// the extension is unknown.
#[must_use]
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string()
}

/// Format a byte count with decimal units, truncating: `1500` → `"1 KB"`.
#[must_use]
pub fn format_size(content_length: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    let mut value = content_length;
    let mut unit = 0;
    while value >= 1000 && unit < UNITS.len() - 1 {
        value /= 1000;
        unit += 1;
    }
    format!("{value} {}", UNITS[unit])
}

/// Percent-encoded `file:///` URL for a local path; relative paths are
/// resolved against the working directory. Empty if no URL can be formed.
#[must_use]
pub fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute).map_or_else(|()| String::new(), String::from)
}
