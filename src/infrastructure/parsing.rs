//! HTML parsing infrastructure for listing pages
//!
//! Selector compilation with ordered fallbacks and per-card field extraction.

pub mod listing_parser;
pub mod selector_set;

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use listing_parser::{ListingParser, ParsedPage};
pub use selector_set::SelectorSet;
