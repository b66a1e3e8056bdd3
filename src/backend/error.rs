use reqwest::StatusCode;
use thiserror::Error;

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures surfaced by the backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A token-only endpoint was called without a signed-in session.
    #[error("request requires a signed-in session")]
    MissingToken,

    #[error("backend rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("backend denied access: {0}")]
    Forbidden(String),

    #[error("backend returned {status}: {detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn from_status(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(detail),
            StatusCode::FORBIDDEN => BackendError::Forbidden(detail),
            _ => BackendError::Rejected { status, detail },
        }
    }

    /// True when the session is missing or no longer accepted.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            BackendError::MissingToken | BackendError::Unauthorized(_)
        )
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, BackendError::Forbidden(_))
    }

    /// Message safe to show next to a form. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::MissingToken => "Please log in to continue.".to_string(),
            BackendError::Unauthorized(detail)
            | BackendError::Forbidden(detail)
            | BackendError::Rejected { detail, .. } => detail.clone(),
            BackendError::Transport(_) | BackendError::Decode(_) => GENERIC_MESSAGE.to_string(),
        }
    }

    /// Status to answer a form post with when re-rendering after this error.
    pub fn response_status(&self) -> StatusCode {
        match self {
            BackendError::MissingToken | BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BackendError::Forbidden(_) => StatusCode::FORBIDDEN,
            BackendError::Rejected { status, .. } if status.is_client_error() => *status,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

pub(crate) fn generic_detail() -> String {
    GENERIC_MESSAGE.to_string()
}
