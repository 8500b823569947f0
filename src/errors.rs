use reqwest::StatusCode;
use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response.
    Network(String),
    /// The server answered with a non-2xx status.
    Http { status: StatusCode, message: String },
    /// The server rejected the token, or no session was available.
    SessionExpired,
    /// Client-side input check failed; nothing was sent.
    Validation(String),
    /// A 2xx response whose body could not be decoded.
    MalformedBody(String),
    /// A submission is already in flight for this action.
    Busy(&'static str),
    /// Reading or writing the persisted session failed.
    Storage(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn storage(err: impl std::error::Error) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(detail) => write!(f, "could not reach the server: {detail}"),
            Self::Http { status, message } => write!(f, "{message} (status {})", status.as_u16()),
            Self::SessionExpired => f.write_str("Session expired. Please sign in again."),
            Self::Validation(message) => f.write_str(message),
            Self::MalformedBody(detail) => write!(f, "unexpected response body: {detail}"),
            Self::Busy(action) => write!(f, "{action} is already in progress"),
            Self::Storage(detail) => write!(f, "session storage failed: {detail}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err)
    }
}

/// Only the session file goes through this conversion. Response bodies are
/// decoded in `api.rs` and fail as [`ClientError::MalformedBody`].
impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(err)
    }
}

/// Transport failures from sending a request or reading its body.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedBody(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
