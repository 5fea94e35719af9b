use reqwest::StatusCode;
use thiserror::Error;

/// What a failed generation attempt means for the next candidate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The model itself is unknown or can't generate; another may work.
    NextCandidate,
    /// The request is at fault (credential, quota, transport); stop here.
    Fatal,
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion credential is not configured")]
    MissingCredential,

    #[error("completion service returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("completion request timed out")]
    Timeout,

    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("unreadable completion response: {0}")]
    Decode(String),

    #[error("completion service returned no text")]
    Empty,

    #[error("no usable model: {0}")]
    ModelUnavailable(String),
}

impl CompletionError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Api { status, message } => classify(*status, message),
            _ => FailureClass::Fatal,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Decide whether a failed attempt is about the model or about the request.
///
/// Only "no such model" and "model can't do this" advance to the next
/// candidate. Authentication, rate limiting, quota and server errors are
/// the same for every model.
pub fn classify(status: StatusCode, message: &str) -> FailureClass {
    match status {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            FailureClass::NextCandidate
        }
        StatusCode::BAD_REQUEST if mentions_unavailable_model(message) => {
            FailureClass::NextCandidate
        }
        _ => FailureClass::Fatal,
    }
}

fn mentions_unavailable_model(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["not found", "not supported", "unsupported", "is not available"]
        .iter()
        .any(|needle| message.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_moves_on() {
        assert_eq!(
            classify(StatusCode::NOT_FOUND, "models/x is not found"),
            FailureClass::NextCandidate
        );
        assert_eq!(
            classify(StatusCode::METHOD_NOT_ALLOWED, ""),
            FailureClass::NextCandidate
        );
    }

    #[test]
    fn test_bad_request_depends_on_message() {
        assert_eq!(
            classify(
                StatusCode::BAD_REQUEST,
                "models/embedding-001 is not supported for generateContent"
            ),
            FailureClass::NextCandidate
        );
        assert_eq!(
            classify(StatusCode::BAD_REQUEST, "Invalid JSON payload received"),
            FailureClass::Fatal
        );
    }

    #[test]
    fn test_request_level_failures_are_fatal() {
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            // Even if the message happens to mention a model
            assert_eq!(classify(status, "model not found"), FailureClass::Fatal);
        }
    }

    #[test]
    fn test_non_api_errors_are_fatal() {
        assert_eq!(CompletionError::Timeout.class(), FailureClass::Fatal);
        assert_eq!(CompletionError::Empty.class(), FailureClass::Fatal);
        assert_eq!(
            CompletionError::Transport("connection reset".into()).class(),
            FailureClass::Fatal
        );
    }
}
