//! Error types for the interception layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AjaxError>;

#[derive(Error, Debug)]
pub enum AjaxError {
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl From<reqwest::Error> for AjaxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            tracing::warn!("Failed to build request: {}", err);
        }
        AjaxError::Transport(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for AjaxError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        AjaxError::InvalidHeader(err.to_string())
    }
}
