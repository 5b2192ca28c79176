use std::fmt;

/// Machine-readable error codes shared by the issue model and the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    CredentialsUnavailable,
    EmptyIssueId,
    ConnectionFailed,
    TransferCancelled,
    ResponseBodyFailed,
    WorkerFailed,
    StatusFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::CredentialsUnavailable => "E1002",
            Self::EmptyIssueId => "E2001",
            Self::ConnectionFailed => "E4001",
            Self::TransferCancelled => "E4002",
            Self::ResponseBodyFailed => "E4003",
            Self::WorkerFailed => "E4004",
            Self::StatusFailed => "E4005",
        }
    }

    /// Short human-facing summary for logs and dialogs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file could not be read or parsed",
            Self::CredentialsUnavailable => "Credentials could not be decrypted",
            Self::EmptyIssueId => "Issue id must not be empty",
            Self::ConnectionFailed => "Connection to the issue service failed",
            Self::TransferCancelled => "Transfer cancelled",
            Self::ResponseBodyFailed => "Response body could not be read",
            Self::WorkerFailed => "Background request worker failed",
            Self::StatusFailed => "The service rejected the request",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix itol/config.toml and retry."),
            Self::CredentialsUnavailable => Some("Enter the service password again."),
            Self::EmptyIssueId => {
                Some("Only assign an id after the service has created the issue.")
            }
            Self::ConnectionFailed => Some("Check the service URL and network, then retry."),
            Self::TransferCancelled => None,
            Self::ResponseBodyFailed => Some("Retry the request; see the log for the server reply."),
            Self::WorkerFailed => Some("Retry once. If persistent, report a bug with logs."),
            Self::StatusFailed => {
                Some("Check the issue id, permissions and credentials; see the server reply.")
            }
        }
    }

    /// Whether a dialog should be shown for this code.
    ///
    /// Cancellation is user-requested and stays quiet.
    #[must_use]
    pub const fn is_user_visible(self) -> bool {
        !matches!(self, Self::TransferCancelled)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Precondition violations in the issue model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{}: an issue id is required", ErrorCode::EmptyIssueId.code())]
    EmptyIssueId,
}

impl ModelError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyIssueId => ErrorCode::EmptyIssueId,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, ModelError};
    use std::collections::HashSet;

    const ALL: [ErrorCode; 8] = [
        ErrorCode::ConfigParseError,
        ErrorCode::CredentialsUnavailable,
        ErrorCode::EmptyIssueId,
        ErrorCode::ConnectionFailed,
        ErrorCode::TransferCancelled,
        ErrorCode::ResponseBodyFailed,
        ErrorCode::WorkerFailed,
        ErrorCode::StatusFailed,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let text = code.code();
            assert_eq!(text.len(), 5);
            assert!(text.starts_with('E'));
            assert!(text.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn cancellation_is_quiet() {
        assert!(!ErrorCode::TransferCancelled.is_user_visible());
        assert!(ErrorCode::TransferCancelled.hint().is_none());
        assert!(ErrorCode::ConnectionFailed.is_user_visible());
    }

    #[test]
    fn model_error_carries_code() {
        let err = ModelError::EmptyIssueId;
        assert_eq!(err.code(), ErrorCode::EmptyIssueId);
        assert!(err.to_string().starts_with("E2001"));
        assert!(err.hint().is_some());
    }
}
