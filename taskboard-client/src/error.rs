//! Client error type and user-facing messages
//!
//! Every failed call produces a [`ClientError`]. Two renderings exist:
//!
//! - [`ClientError::user_message`]: a fixed, friendly message keyed by HTTP
//!   status, for display
//! - [`ClientError::rejection_message`]: the server's own message when it sent
//!   one, otherwise the friendly message; this is what ends up in
//!   [`crate::state::FetchState::Rejected`]

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for API calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        /// `message` field of the JSON error body, if any
        message: Option<String>,
    },

    /// Request never got a response (connect failure, timeout)
    #[error("No response from server: {0}")]
    NoResponse(String),

    /// Response body did not have the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Request rejected before it was sent
    #[error("{0}")]
    Invalid(String),
}

impl ClientError {
    /// Builds a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ClientError::Status {
            status,
            message: Some(message.into()),
        }
    }

    /// HTTP status, when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Friendly message for display
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { status, message } => match status {
                400 => "Bad request. Please check your input.".to_string(),
                401 => "You are not authorized. Please log in.".to_string(),
                403 => "You do not have permission to perform this action.".to_string(),
                404 => "Resource not found.".to_string(),
                500 => "A server error occurred. Please try again later.".to_string(),
                other => message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| format!("Error {}: Something went wrong.", other)),
            },
            ClientError::NoResponse(_) => {
                "No response from server. Please check your network connection.".to_string()
            }
            ClientError::Decode(_) | ClientError::Invalid(_) => self.to_string(),
        }
    }

    /// Server-supplied message if present, else [`Self::user_message`]
    pub fn rejection_message(&self) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => self.user_message(),
        }
    }
}
