use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::completion::CompletionError;
use crate::critique::{dtos::ErrorResponse, parse::ParseError};
use crate::fetcher::FetchError;

/// Every way a critique request can fail, as reported to the caller.
#[derive(Error, Debug)]
pub enum CritiqueError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    ExtractionFailure(String),

    #[error("server configuration error: {0}")]
    Configuration(String),

    #[error("no completion model is available: {0}")]
    ModelUnavailable(String),

    #[error("failed to fetch the page: {0}")]
    UpstreamFetch(String),

    #[error("the completion service returned no text")]
    CompletionEmpty,

    #[error("could not read a critique from the completion: {0}")]
    JsonExtraction(String),

    #[error("completion request failed: {0}")]
    Completion(String),
}

impl CritiqueError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ExtractionFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Configuration(_)
            | Self::ModelUnavailable(_)
            | Self::UpstreamFetch(_)
            | Self::CompletionEmpty
            | Self::JsonExtraction(_)
            | Self::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for CritiqueError {
    fn from(err: FetchError) -> Self {
        if let Some(status) = err.status() {
            return Self::UpstreamFetch(format!(
                "origin responded with status {}",
                status.as_u16()
            ));
        }

        match err {
            FetchError::InvalidUrl(_) | FetchError::UnsupportedScheme(_) => {
                Self::InvalidRequest(err.to_string())
            }
            ref e if e.is_unreadable_content() => {
                Self::ExtractionFailure(format!("the page could not be read as HTML ({e})"))
            }
            other => Self::UpstreamFetch(other.to_string()),
        }
    }
}

impl From<CompletionError> for CritiqueError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingCredential => Self::Configuration(err.to_string()),
            CompletionError::ModelUnavailable(message) => Self::ModelUnavailable(message),
            CompletionError::Empty => Self::CompletionEmpty,
            other => Self::Completion(other.to_string()),
        }
    }
}

impl From<ParseError> for CritiqueError {
    fn from(err: ParseError) -> Self {
        Self::JsonExtraction(err.to_string())
    }
}

impl IntoResponse for CritiqueError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
