//! Labeled sample coffee products
//!
//! Used in two places: a synthetic listing page that replaces a page whose
//! fetch failed every retry, and the opt-in dataset folded into a run where
//! every site failed. Both are tagged so they can never pass for scraped data:
//! each card carries `data-sample="true"` and products get the `sample_data`
//! source.

use crate::domain::classification::{build_product, PriceTierThresholds, RawListing};
use crate::domain::product::{Product, SAMPLE_SOURCE};
use crate::domain::sites::{AlternativeSelectors, SiteConfig, SiteQuirks};

/// Marker attribute present on every synthesized card
pub const SAMPLE_MARKER: &str = "data-sample=\"true\"";

/// (name, price in PKR, rating, reviews)
pub const SAMPLE_LISTINGS: [(&str, f64, f64, u32); 10] = [
    ("Nescafe Classic Instant Coffee 200g", 950.0, 4.5, 120),
    ("Nescafe Gold Blend Premium Coffee 100g Jar", 1250.0, 4.7, 85),
    ("Davidoff Rich Aroma Ground Coffee 250g", 2350.0, 4.8, 42),
    ("Lavazza Qualita Oro Ground Coffee 250g", 2100.0, 4.6, 38),
    ("Maxwell House Original Roast Ground Coffee 300g", 1800.0, 4.2, 29),
    ("Mehran Instant Coffee Powder 50g", 450.0, 3.9, 65),
    ("Nescafe 3 in 1 Instant Coffee Mix 30 Sticks", 850.0, 4.4, 95),
    ("Folgers Classic Roast Ground Coffee 226g", 1550.0, 4.3, 22),
    ("Continental Premium Blend Coffee Powder 100g", 750.0, 4.0, 48),
    ("Kauphy Italian Roast Coffee Beans 250g", 1950.0, 4.8, 15),
];

/// Minimal listing page holding the sample products, one card each
pub fn synthetic_page(url: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><head><title>Sample coffee listing</title>");
    html.push_str("<meta name=\"generator\" content=\"coffee-market-collector sample data\">");
    html.push_str(&format!("<meta name=\"source-url\" content=\"{}\">", escape(url)));
    html.push_str("</head><body><div class=\"products\">\n");

    for (name, price, rating, reviews) in SAMPLE_LISTINGS {
        html.push_str(&format!(
            "<div class=\"product-item\" {SAMPLE_MARKER}>\
             <h2 class=\"product-name\">{}</h2>\
             <div class=\"price\">Rs. {}</div>\
             <div class=\"rating\">{}</div>\
             <div class=\"reviews\">({})</div>\
             </div>\n",
            escape(name),
            price,
            rating,
            reviews
        ));
    }

    html.push_str("</div></body></html>\n");
    html
}

/// Selector profile that reads synthesized pages, keeping the site's identity
pub fn sample_profile(site: &SiteConfig) -> SiteConfig {
    SiteConfig {
        name: site.name.clone(),
        source: SAMPLE_SOURCE.to_string(),
        search_url: site.search_url.clone(),
        product_selector: "div.product-item[data-sample=\"true\"]".to_string(),
        name_selector: ".product-name".to_string(),
        price_selector: ".price".to_string(),
        requires_browser: false,
        alternative_selectors: AlternativeSelectors::default(),
        rating_selector: Some(".rating".to_string()),
        reviews_selector: Some(".reviews".to_string()),
        quirks: SiteQuirks {
            pagination: site.quirks.pagination,
            save_debug_html: false,
        },
    }
}

/// The sample dataset as classified products with the `sample_data` source
pub fn sample_products(thresholds: &PriceTierThresholds) -> Vec<Product> {
    SAMPLE_LISTINGS
        .iter()
        .map(|(name, price, rating, reviews)| {
            build_product(
                RawListing {
                    name: (*name).to_string(),
                    price: *price,
                    rating: *rating,
                    reviews_count: *reviews,
                },
                SAMPLE_SOURCE,
                thresholds,
            )
        })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
