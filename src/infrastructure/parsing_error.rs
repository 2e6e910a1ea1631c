//! Parsing error types for listing-page extraction
//!
//! Selector compilation and card extraction errors, with a recoverability
//! hint so callers know whether to skip one card or give up on a site.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No products found on {url}")]
    NoProductsFound {
        url: String,
        tried_selectors: Vec<String>,
    },

    #[error("Product validation failed: {reason}")]
    ProductValidationFailed { reason: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(str::to_string),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a no products found error with tried selectors
    pub fn no_products_found(url: &str, tried_selectors: Vec<String>) -> Self {
        Self::NoProductsFound {
            url: url.to_string(),
            tried_selectors,
        }
    }

    /// Check if this error only affects a single card
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RequiredFieldMissing { .. } | Self::ProductValidationFailed { .. } => true,
            Self::InvalidSelector { .. } | Self::NoProductsFound { .. } => false,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
