//! Result of one HTTP exchange.
//!
//! Failures are data here rather than `Err` values; see
//! [`HttpResponse::error_code`] for how they are classified.

use crate::request::split_header;
use itol_core::ErrorCode;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Outcome of one send.
///
/// A response may carry both a status and an error message: a body that
/// failed to read after a successful status line keeps the status. Check
/// both before trusting the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// `None` when no status line was received.
    pub status: Option<u16>,
    /// `"name: value"` lines in arrival order, one per name holding its
    /// first value. Names arrive lowercased; use [`HttpResponse::header`]
    /// for lookups.
    pub headers: Vec<String>,
    /// Decoded body for textual content types.
    pub content: Option<String>,
    /// Temp file holding a binary body. Owned by the caller.
    pub file: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl HttpResponse {
    /// 2xx status and no captured error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_message.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }

    /// First header value with this name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = split_header(line);
            key.eq_ignore_ascii_case(name).then_some(value)
        })
    }

    /// Parse the textual content as JSON.
    ///
    /// # Errors
    ///
    /// Fails if there is no textual content or it does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(self.content.as_deref().unwrap_or_default())
    }

    /// Classify the captured failure, if any: no status means the exchange
    /// never completed, a non-2xx status means the service refused, and an
    /// error after a 2xx status means the body could not be read.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match (&self.error_message, self.status) {
            (None, _) => None,
            (Some(_), None) => Some(ErrorCode::ConnectionFailed),
            (Some(_), Some(200..=299)) => Some(ErrorCode::ResponseBodyFailed),
            (Some(_), Some(_)) => Some(ErrorCode::StatusFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: Option<u16>, error: Option<&str>) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![
                "Content-Type: application/json".into(),
                "X-Empty".into(),
            ],
            content: Some(r#"{"key":"ITOL-7","fields":{"summary":"crash"}}"#.into()),
            file: None,
            error_message: error.map(str::to_string),
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(Some(200), None);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("x-empty"), Some(""));
        assert_eq!(resp.header("Location"), None);
    }

    #[test]
    fn success_needs_status_and_no_error() {
        assert!(response(Some(201), None).is_success());
        assert!(!response(Some(200), Some("truncated")).is_success());
        assert!(!response(Some(404), None).is_success());
        assert!(!response(None, Some("refused")).is_success());
    }

    #[test]
    fn error_code_distinguishes_connection_status_and_body() {
        assert_eq!(response(Some(200), None).error_code(), None);
        assert_eq!(
            response(None, Some("refused")).error_code(),
            Some(ErrorCode::ConnectionFailed)
        );
        assert_eq!(
            response(Some(200), Some("invalid gzip header")).error_code(),
            Some(ErrorCode::ResponseBodyFailed)
        );
        assert_eq!(
            response(Some(404), Some("status code 404")).error_code(),
            Some(ErrorCode::StatusFailed)
        );
        assert_eq!(
            response(Some(401), Some("status code 401")).error_code(),
            Some(ErrorCode::StatusFailed)
        );
    }

    #[test]
    fn json_content_deserializes() -> serde_json::Result<()> {
        #[derive(Deserialize)]
        struct Fields {
            summary: String,
        }
        #[derive(Deserialize)]
        struct Created {
            key: String,
            fields: Fields,
        }
        let created: Created = response(Some(201), None).json()?;
        assert_eq!(created.key, "ITOL-7");
        assert_eq!(created.fields.summary, "crash");
        Ok(())
    }

    #[test]
    fn json_without_content_fails() {
        let resp = HttpResponse::default();
        assert!(resp.json::<serde_json::Value>().is_err());
    }
}
