//! Site configuration table
//!
//! One entry per target shop: the search URL, the primary selectors, ordered
//! fallback selectors and the small set of per-site quirks (pagination style,
//! optional rating fields, debug snapshots). Every extraction goes through the
//! same routine; sites only differ by the data in this table.

use serde::{Deserialize, Serialize};

/// Ordered fallback selectors tried when the primary selector finds nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativeSelectors {
    pub product_selector: Vec<String>,
    pub name_selector: Vec<String>,
    pub price_selector: Vec<String>,
}

/// How page N (N > 1) of a search result is addressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `page=N` query parameter
    #[default]
    QueryPage,
    /// `p=N` query parameter (Magento shops)
    QueryP,
    /// `/page/N` path segment
    PathSegment,
}

/// Per-site behavior that is not a selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteQuirks {
    pub pagination: PaginationStyle,
    /// Write the first result page to the debug directory
    pub save_debug_html: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Identifier stored in `Product::source`
    pub source: String,
    pub search_url: String,
    pub product_selector: String,
    pub name_selector: String,
    pub price_selector: String,
    #[serde(rename = "requires_selenium", default)]
    pub requires_browser: bool,
    #[serde(default)]
    pub alternative_selectors: AlternativeSelectors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_selector: Option<String>,
    #[serde(flatten)]
    pub quirks: SiteQuirks,
}

impl SiteConfig {
    /// Primary product selector followed by its alternatives, in try order
    pub fn product_selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.product_selector.as_str())
            .chain(self.alternative_selectors.product_selector.iter().map(String::as_str))
    }

    pub fn name_selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name_selector.as_str())
            .chain(self.alternative_selectors.name_selector.iter().map(String::as_str))
    }

    pub fn price_selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.price_selector.as_str())
            .chain(self.alternative_selectors.price_selector.iter().map(String::as_str))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn site(
    name: &str,
    source: &str,
    search_url: &str,
    primary: [&str; 3],
    alternatives: [&[&str]; 3],
    quirks: SiteQuirks,
) -> SiteConfig {
    let [product_selector, name_selector, price_selector] = primary;
    let [alt_products, alt_names, alt_prices] = alternatives;
    SiteConfig {
        name: name.to_string(),
        source: source.to_string(),
        search_url: search_url.to_string(),
        product_selector: product_selector.to_string(),
        name_selector: name_selector.to_string(),
        price_selector: price_selector.to_string(),
        requires_browser: true,
        alternative_selectors: AlternativeSelectors {
            product_selector: strings(alt_products),
            name_selector: strings(alt_names),
            price_selector: strings(alt_prices),
        },
        rating_selector: None,
        reviews_selector: None,
        quirks,
    }
}

/// Built-in site table, in collection order
pub fn default_sites() -> Vec<SiteConfig> {
    let debug = SiteQuirks {
        pagination: PaginationStyle::QueryPage,
        save_debug_html: true,
    };

    let mut daraz = site(
        "daraz",
        "daraz.pk",
        "https://www.daraz.pk/catalog/?q=coffee",
        ["div._17mcb > div", "div.buTCk div.RfADt > a", ".price--NVB62"],
        [
            &[
                "div.box--ujueT",
                "div.product-card",
                ".gridItem--Yd0sa",
                "div[class*=\"card--\"]",
                "div[data-qa-locator=\"product-item\"]",
            ],
            &[
                ".title--wFj93",
                "a[title]",
                ".pdp-mod-product-badge-title",
                "h2 > a",
                ".item-title",
                "a[href*=\"/products/\"]",
            ],
            &[".price", "[data-price]", ".currency--GVKjl", "span[class*=\"price\"]"],
        ],
        debug.clone(),
    );
    daraz.rating_selector = Some(".rating--b2Qtx".to_string());
    daraz.reviews_selector = Some(".rating__review--ygkUy".to_string());

    let alfatah = site(
        "alfatah",
        "alfatah.pk",
        "https://alfatah.pk/search?q=coffee&options%5Bprefix%5D=last",
        [".product-card.card-border", ".product-title a", ".product-price"],
        [
            &[
                ".col-6.col-sm-4.col-md-3.col-lg-2 .product-card",
                ".product-grid__item",
                ".card",
            ],
            &[
                ".product-title-ellipsis",
                ".card__heading",
                ".product-item-title",
                ".full-unstyled-link",
            ],
            &["p.product-price", ".price-item", ".price", ".price__regular"],
        ],
        debug.clone(),
    );

    let naheed = site(
        "naheed",
        "naheed.pk",
        "https://www.naheed.pk/catalogsearch/result/?q=coffee",
        [
            "li.item.product.product-item",
            ".product.details.product-item-details .product-item-name .product-item-link",
            ".price-box .price",
        ],
        [
            &[
                ".category-products.products.wrapper.grid.products-grid > div > div > ol > li",
                ".product-item-info",
            ],
            &[
                ".product-item-name .product-item-link",
                ".product-name a",
                ".product-item-link",
                ".product.details.product-item-details",
                ".product-name",
            ],
            &[".price-container .price", ".special-price"],
        ],
        SiteQuirks {
            pagination: PaginationStyle::QueryP,
            save_debug_html: true,
        },
    );

    let metro = site(
        "metro",
        "metro-online.pk",
        "https://www.metro-online.pk/search/coffee?searchText=coffee&url=&isSearched=true",
        [".product-item", ".product-item-link", ".price"],
        [
            &["li.product-item", "li.product", ".product-item-info"],
            &["h2.product-name", "h2.woocommerce-loop-product__title", ".product-name"],
            &["span.price", ".price-box"],
        ],
        debug.clone(),
    );

    let alibaba = site(
        "alibaba",
        "alibaba.pk",
        "https://www.alibaba.com/trade/search?tab=all&SearchText=coffee",
        [
            ".J-offer-wrapper",
            ".elements-title-normal__content",
            ".elements-offer-price-normal__price",
        ],
        [
            &[
                ".item-area",
                ".organic-list-offer-outter",
                ".product-item",
                ".item",
                ".product-box",
            ],
            &[
                ".product-name",
                ".organic-list-offer-name",
                "h2.product-name",
                ".product-title",
                ".name",
            ],
            &[
                ".price-box",
                ".organic-list-offer-price",
                ".price",
                ".product-price",
            ],
        ],
        SiteQuirks {
            pagination: PaginationStyle::PathSegment,
            save_debug_html: false,
        },
    );

    let foodpanda = site(
        "foodpanda",
        "foodpanda.pk",
        "https://www.foodpanda.pk/groceries/pandamart/s/search/coffee",
        [".dish-card", ".dish-name", ".price"],
        [
            &[
                "ul.product-grid > li",
                ".groceries-product-card",
                ".product-card",
                ".product-item",
                ".product",
            ],
            &[
                ".groceries-product-card-name",
                ".product-name",
                ".title",
                ".name",
            ],
            &[
                ".groceries-product-card-price",
                ".discount-price",
                ".product-price",
                ".amount",
            ],
        ],
        debug,
    );

    vec![daraz, alfatah, naheed, metro, alibaba, foodpanda]
}
