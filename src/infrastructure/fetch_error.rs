//! Transport error types for page fetching

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("Browser rendering failed for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Browser rendering is not available in this build")]
    BrowserUnavailable,

    #[error("All {attempts} attempts failed for {url}: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl FetchError {
    pub fn request(url: &str, error: impl std::fmt::Display) -> Self {
        Self::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn browser(url: &str, error: impl std::fmt::Display) -> Self {
        Self::Browser {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Whether another attempt at the same URL could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::BrowserUnavailable | Self::Exhausted { .. })
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
