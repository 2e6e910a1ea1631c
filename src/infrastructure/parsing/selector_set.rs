//! Compiled primary + fallback selectors

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{ParsingError, ParsingResult};

/// Selectors tried in order; the primary always comes first
#[derive(Debug, Clone)]
pub struct SelectorSet {
    entries: Vec<(String, Selector)>,
}

impl SelectorSet {
    /// Compile selectors in try order; the first one is the primary
    ///
    /// A missing or invalid primary is a configuration error. Invalid
    /// alternatives are logged and dropped.
    pub fn compile<'a>(field: &str, selectors: impl IntoIterator<Item = &'a str>) -> ParsingResult<Self> {
        let mut selectors = selectors.into_iter();
        let primary = selectors
            .next()
            .ok_or_else(|| ParsingError::invalid_selector("", format!("no {} selector configured", field)))?;
        let primary_selector = Selector::parse(primary)
            .map_err(|e| ParsingError::invalid_selector(primary, e))?;

        let mut entries = vec![(primary.to_string(), primary_selector)];
        for alternative in selectors {
            match Selector::parse(alternative) {
                Ok(selector) => entries.push((alternative.to_string(), selector)),
                Err(e) => warn!("Skipping invalid {} selector '{}': {}", field, alternative, e),
            }
        }

        Ok(Self { entries })
    }

    /// Compile an optional single selector, dropping it with a warning when invalid
    pub fn compile_optional(field: &str, selector: Option<&str>) -> Option<Self> {
        let selector = selector?;
        match Self::compile(field, [selector]) {
            Ok(set) => Some(set),
            Err(e) => {
                warn!("Ignoring {} selector: {}", field, e);
                None
            }
        }
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(text, _)| text.as_str())
    }

    /// Elements matched by the first selector that matches anything, with that selector
    pub fn select_first_matching<'a>(&self, document: &'a Html) -> Option<(&str, Vec<ElementRef<'a>>)> {
        self.entries.iter().find_map(|(text, selector)| {
            let matches: Vec<ElementRef<'a>> = document.select(selector).collect();
            (!matches.is_empty()).then_some((text.as_str(), matches))
        })
    }

    /// Text of the first selector whose first match inside `element` has any text
    pub fn first_text(&self, element: &ElementRef<'_>) -> Option<String> {
        self.entries.iter().find_map(|(_, selector)| {
            element
                .select(selector)
                .next()
                .map(|found| normalized_text(&found))
                .filter(|text| !text.is_empty())
        })
    }
}

/// Element text with whitespace runs collapsed to single spaces
pub fn normalized_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
