//! Search-result page parser driven by a site's selector table
//!
//! Cards are selected with the primary product selector, falling back through
//! the alternatives. Each card yields a [`RawListing`]; a missing name falls
//! back to `Unknown` and missing numbers to 0. A card with neither a name nor
//! a price is an error.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html};
use tracing::debug;

use super::selector_set::SelectorSet;
use super::{ParsingError, ParsingResult};
use crate::domain::classification::{clean_price, parse_rating, parse_reviews_count, RawListing};
use crate::domain::constants::UNKNOWN_NAME;
use crate::domain::sites::SiteConfig;

/// Longest believable product name; longer text means the card selector matched a container
pub const MAX_NAME_CHARS: usize = 300;

/// Cards extracted from one page
#[derive(Debug)]
pub struct ParsedPage {
    /// Product selector that matched, `None` when no selector matched
    pub selector_used: Option<String>,
    pub cards: Vec<ParsingResult<RawListing>>,
}

impl ParsedPage {
    pub fn cards_found(&self) -> usize {
        self.cards.len()
    }
}

/// Parser for one site's listing pages
#[derive(Debug, Clone)]
pub struct ListingParser {
    site: String,
    products: SelectorSet,
    names: SelectorSet,
    prices: SelectorSet,
    rating: Option<SelectorSet>,
    reviews: Option<SelectorSet>,
}

impl ListingParser {
    /// Compile the site's selectors
    pub fn for_site(site: &SiteConfig) -> ParsingResult<Self> {
        Ok(Self {
            site: site.name.clone(),
            products: SelectorSet::compile("product", site.product_selectors())?,
            names: SelectorSet::compile("name", site.name_selectors())?,
            prices: SelectorSet::compile("price", site.price_selectors())?,
            rating: SelectorSet::compile_optional("rating", site.rating_selector.as_deref()),
            reviews: SelectorSet::compile_optional("reviews", site.reviews_selector.as_deref()),
        })
    }

    /// Product selectors in try order
    pub fn product_selectors(&self) -> Vec<String> {
        self.products.selectors().map(str::to_string).collect()
    }

    /// Parse a listing page into per-card results
    pub fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let Some((selector_used, elements)) = self.products.select_first_matching(&document) else {
            debug!("[{}] No product selector matched", self.site);
            return ParsedPage {
                selector_used: None,
                cards: Vec::new(),
            };
        };

        debug!("[{}] Found {} cards with '{}'", self.site, elements.len(), selector_used);

        ParsedPage {
            selector_used: Some(selector_used.to_string()),
            cards: elements.iter().map(|card| self.extract_card(card)).collect(),
        }
    }

    fn extract_card(&self, card: &ElementRef<'_>) -> ParsingResult<RawListing> {
        let name = self.names.first_text(card);
        let price_text = self.prices.first_text(card);

        if name.is_none() && price_text.is_none() {
            return Err(ParsingError::required_field_missing(
                "name",
                Some("card has neither a name nor a price"),
            ));
        }

        let name = name.unwrap_or_else(|| UNKNOWN_NAME.to_string());

        if name.chars().count() > MAX_NAME_CHARS {
            return Err(ParsingError::ProductValidationFailed {
                reason: format!(
                    "name has {} characters, the card selector likely matched a container",
                    name.chars().count()
                ),
            });
        }

        let price = price_text.map_or(0.0, |text| clean_price(&text));

        let rating = self
            .rating
            .as_ref()
            .and_then(|set| set.first_text(card))
            .map_or(0.0, |text| parse_rating(&text));

        let reviews_count = self
            .reviews
            .as_ref()
            .and_then(|set| set.first_text(card))
            .map_or(0, |text| parse_reviews_count(&text));

        Ok(RawListing {
            name,
            price,
            rating,
            reviews_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sites::{default_sites, AlternativeSelectors, SiteQuirks};
    use crate::infrastructure::sample_data;

    fn shop() -> SiteConfig {
        SiteConfig {
            name: "shop".to_string(),
            source: "shop.pk".to_string(),
            search_url: "https://shop.pk/search?q=coffee".to_string(),
            product_selector: ".does-not-exist".to_string(),
            name_selector: ".name".to_string(),
            price_selector: ".price".to_string(),
            requires_browser: false,
            alternative_selectors: AlternativeSelectors {
                product_selector: vec!["li.tile".to_string()],
                name_selector: vec!["a[title]".to_string()],
                price_selector: vec![".amount".to_string()],
            },
            rating_selector: None,
            reviews_selector: None,
            quirks: SiteQuirks::default(),
        }
    }

    #[test]
    fn alternatives_and_defaults_fill_card_fields() {
        let html = r#"<ul>
            <li class="tile"><span class="name">Nescafe Classic 200g</span><span class="price">Rs. 950</span></li>
            <li class="tile"><a title="t">Lavazza Oro 250g</a><b class="amount">PKR 2,100</b></li>
            <li class="tile"><b class="amount">Rs. 300</b></li>
            <li class="tile"><em>no fields at all</em></li>
        </ul>"#;

        let parser = ListingParser::for_site(&shop()).unwrap();
        let page = parser.parse_page(html);

        assert_eq!(page.selector_used.as_deref(), Some("li.tile"));
        assert_eq!(page.cards_found(), 4);
        assert!(matches!(page.cards[3], Err(ParsingError::RequiredFieldMissing { .. })));

        let cards: Vec<RawListing> = page.cards.into_iter().take(3).map(Result::unwrap).collect();
        assert_eq!(cards[0].name, "Nescafe Classic 200g");
        assert_eq!(cards[0].price, 950.0);
        assert_eq!(cards[1].name, "Lavazza Oro 250g");
        assert_eq!(cards[1].price, 2100.0);
        assert_eq!(cards[2].name, UNKNOWN_NAME);
        assert_eq!(cards[2].price, 300.0);
    }

    #[test]
    fn page_without_matches_reports_no_selector() {
        let parser = ListingParser::for_site(&shop()).unwrap();
        let page = parser.parse_page("<html><body>blocked</body></html>");
        assert!(page.selector_used.is_none());
        assert_eq!(page.cards_found(), 0);
    }

    #[test]
    fn oversized_name_is_a_card_error() {
        let long_name = "coffee ".repeat(60);
        let html = format!(r#"<li class="tile"><span class="name">{}</span></li>"#, long_name);
        let parser = ListingParser::for_site(&shop()).unwrap();

        let page = parser.parse_page(&html);
        assert!(matches!(page.cards[0], Err(ParsingError::ProductValidationFailed { .. })));
    }

    #[test]
    fn invalid_primary_selector_fails_the_site() {
        let mut site = shop();
        site.product_selector = "div[".to_string();
        assert!(ListingParser::for_site(&site).is_err());
    }

    #[test]
    fn sample_profile_reads_synthetic_page() {
        let profile = sample_data::sample_profile(&default_sites()[0]);
        let parser = ListingParser::for_site(&profile).unwrap();
        let page = parser.parse_page(&sample_data::synthetic_page("https://www.daraz.pk/"));

        assert_eq!(page.cards_found(), 10);
        let first = page.cards[0].as_ref().unwrap();
        assert_eq!(first.name, "Nescafe Classic Instant Coffee 200g");
        assert_eq!(first.price, 950.0);
        assert_eq!(first.rating, 4.5);
        assert_eq!(first.reviews_count, 120);
    }

    #[test]
    fn default_site_selectors_all_compile() {
        for site in default_sites() {
            let parser = ListingParser::for_site(&site).unwrap();
            assert_eq!(
                parser.product_selectors().len(),
                1 + site.alternative_selectors.product_selector.len(),
                "{} has an invalid product selector",
                site.name
            );
        }
    }
}
