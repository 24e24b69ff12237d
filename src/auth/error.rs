use thiserror::Error;

/// Errors raised by the device-flow client and token storage.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to connect to the authorization server: {0}")]
    Connection(String),
    #[error("server returned {status}: {message}")]
    Protocol { status: u16, message: String },
    #[error("server responded with unexpected output: {0}")]
    UnexpectedOutput(String),
    #[error("the user denied the token request")]
    AccessDenied,
    #[error("device flow timed out: {0}")]
    TimedOut(String),
    #[error("no device flow request is in progress")]
    RequestNotInProgress,
    #[error("IO error: {0}")]
    Io(String),
}

impl AuthError {
    /// Whether a caller's retry policy may reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether the device-flow session this error came from is finished.
    /// Retrying requires a new `make_request`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::TimedOut(_) | Self::UnexpectedOutput(_)
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::UnexpectedOutput(error.to_string())
        } else {
            Self::Connection(error.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
