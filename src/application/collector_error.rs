//! Per-site collection errors

use thiserror::Error;

use crate::infrastructure::fetch_error::FetchError;
use crate::infrastructure::parsing_error::ParsingError;

/// Anything that stops one site's extraction; the run itself continues
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parsing failed: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Invalid configuration for site '{site}': {reason}")]
    InvalidSiteConfig { site: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CollectorResult<T> = Result<T, CollectorError>;
