//! Transport error types.

use itol_core::ErrorCode;
use std::io;

/// Conditions that abort a send instead of being captured in the response.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The caller cancelled through the progress reporter.
    #[error("transfer for {url} was cancelled")]
    Cancelled { url: String },

    /// The background worker running an async send died.
    #[error("request worker failed: {0}")]
    Worker(String),
}

impl HttpError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cancelled { .. } => ErrorCode::TransferCancelled,
            Self::Worker(_) => ErrorCode::WorkerFailed,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Credentials could not be turned into an `Authorization` header.
#[derive(Debug, thiserror::Error)]
#[error("credentials unavailable: {reason}")]
pub struct CredentialError {
    pub reason: String,
}

impl CredentialError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CredentialsUnavailable
    }
}

/// Outcome of a chunked copy loop.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransferError {
    #[error("transfer cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_maps_to_quiet_code() {
        let err = HttpError::Cancelled {
            url: "http://tracker/rest".into(),
        };
        assert!(err.is_cancelled());
        assert_eq!(err.code(), ErrorCode::TransferCancelled);
        assert!(!err.code().is_user_visible());
        assert!(err.to_string().contains("http://tracker/rest"));
    }

    #[test]
    fn worker_failure_has_hint() {
        let err = HttpError::Worker("panicked".into());
        assert!(!err.is_cancelled());
        assert_eq!(err.code(), ErrorCode::WorkerFailed);
        assert!(err.hint().is_some());
    }

    #[test]
    fn credential_error_is_coded() {
        let err = CredentialError::new("bad key");
        assert_eq!(err.code(), ErrorCode::CredentialsUnavailable);
        assert_eq!(err.to_string(), "credentials unavailable: bad key");
    }
}
