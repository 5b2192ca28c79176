//! What to send: method, URL, header lines and an optional body.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

/// Request body source.
pub enum Body {
    /// In-memory text, sent as UTF-8 with an explicit length.
    Text(String),
    /// A local file; its length is taken from the file metadata.
    File(PathBuf),
    /// Any byte stream, with a length if the caller knows it.
    Stream {
        reader: Box<dyn Read + Send>,
        length: Option<u64>,
    },
}

impl Body {
    /// Open the body for reading and report its length, if known.
    pub(crate) fn open(self) -> io::Result<(Box<dyn Read + Send>, Option<u64>)> {
        match self {
            Self::Text(text) => {
                let bytes = text.into_bytes();
                let length = u64::try_from(bytes.len()).ok();
                Ok((Box::new(Cursor::new(bytes)), length))
            }
            Self::File(path) => {
                let file = File::open(&path)?;
                let length = file.metadata()?.len();
                Ok((Box::new(file), Some(length)))
            }
            Self::Stream { reader, length } => Ok((reader, length)),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One HTTP exchange to perform.
///
/// Headers are `"Name: value"` lines applied in order; a later line with
/// the same name replaces an earlier one.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<String>,
    pub body: Option<Body>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    #[must_use]
    pub fn post(url: impl Into<String>, content: impl Into<Body>) -> Self {
        Self::new("POST", url).body(content)
    }

    #[must_use]
    pub fn upload(url: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self::new("POST", url).body(Body::File(file.into()))
    }

    #[must_use]
    pub fn header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    #[must_use]
    pub fn headers<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(lines.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Split a `"Name: value"` line. A line without a colon is a bare name.
#[must_use]
pub fn split_header(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}
