//! API error types.

/// Errors from pantry service requests.
///
/// The `Display` text is what views show to the user.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// No bearer token is available for an authenticated request.
    #[error("Not logged in (no bearer token stored)")]
    MissingToken,

    /// The request did not complete in time.
    #[error("Request to the pantry service timed out")]
    Timeout,

    /// The request could not be sent or the connection failed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The configured base URL is not usable.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Map a transport error, keeping timeouts distinct.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.to_string())
        }
    }

    /// HTTP status of the response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service rejected the credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
