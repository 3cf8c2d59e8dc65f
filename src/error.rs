//! Client Errors
//!
//! Failure envelopes mapped back onto the server's error taxonomy.

use optimistic_list::Busy;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{0}")]
    AuthenticationRequired(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    UpstreamFailure(String),
    /// The request never produced an envelope
    #[error("Network error: {0}")]
    Transport(String),
    #[error(transparent)]
    Busy(#[from] Busy),
}

impl ClientError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ClientError::ValidationFailed(msg.into())
    }

    /// Classify a failure envelope by its HTTP status
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::ValidationFailed(message)
            }
            StatusCode::UNAUTHORIZED => ClientError::AuthenticationRequired(message),
            StatusCode::FORBIDDEN => ClientError::PermissionDenied(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::UpstreamFailure(message),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let msg = || "x".to_string();
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, msg()),
            ClientError::ValidationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, msg()),
            ClientError::PermissionDenied(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, msg()),
            ClientError::UpstreamFailure(_)
        ));
    }

    #[test]
    fn test_message_is_shown_verbatim() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "Todo 4 not found".to_string());
        assert_eq!(err.to_string(), "Todo 4 not found");
    }
}
