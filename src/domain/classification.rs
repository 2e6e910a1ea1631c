//! Product classification rules
//!
//! Pure functions that turn a scraped product name and price text into the
//! normalized fields of a [`Product`]: relevance filter, price cleaning,
//! brand, coffee type, packaging size and price tier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::constants::{brands, pricing, relevance, UNKNOWN_NAME};
use super::product::{CoffeeType, Packaging, PriceTier, Product};

static CURRENCY_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)rs\.?|pkr|₨|,").expect("valid currency regex"));

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// Size patterns tried in order: (pattern, normalized unit, multiplier)
static PACKAGING_PATTERNS: Lazy<Vec<(Regex, &'static str, f64)>> = Lazy::new(|| {
    [
        (r"(\d+(?:\.\d+)?)\s*(?:kg|kgs|kilo|kilos|kilogram|kilograms)\b", "g", 1000.0),
        (r"(\d+(?:\.\d+)?)\s*(?:g|gm|gms|gr|gram|grams)\b", "g", 1.0),
        (r"(\d+(?:\.\d+)?)\s*(?:oz|ounce|ounces)\b", "g", 28.35),
        (r"(\d+(?:\.\d+)?)\s*ml\b", "ml", 1.0),
        (r"(\d+(?:\.\d+)?)\s*(?:l|ltr|liter|litre|liters|litres)\b", "ml", 1000.0),
        (
            r"(\d+)\s*(?:pack|packs|sachet|sachets|stick|sticks|capsule|capsules|pod|pods)\b",
            "count",
            1.0,
        ),
    ]
    .into_iter()
    .map(|(pattern, unit, factor)| (Regex::new(pattern).expect("valid packaging regex"), unit, factor))
    .collect()
});

/// Scraped card fields before classification
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub reviews_count: u32,
}

/// Inclusive upper bounds of the `low` and `mid` price tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTierThresholds {
    pub low_max: f64,
    pub mid_max: f64,
}

impl Default for PriceTierThresholds {
    fn default() -> Self {
        Self {
            low_max: pricing::LOW_TIER_MAX,
            mid_max: pricing::MID_TIER_MAX,
        }
    }
}

impl PriceTierThresholds {
    pub fn tier_for(&self, price: f64) -> PriceTier {
        if price <= self.low_max {
            PriceTier::Low
        } else if price <= self.mid_max {
            PriceTier::Mid
        } else {
            PriceTier::Premium
        }
    }
}

/// Whether a product name looks like an actual coffee product
pub fn is_coffee_product(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN_NAME {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if relevance::EXCLUDED_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return false;
    }

    relevance::COFFEE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Parse a price label such as `Rs. 1,250` into a number, 0 when nothing numeric is found
pub fn clean_price(text: &str) -> f64 {
    let stripped = CURRENCY_TOKENS.replace_all(text, "");
    let stripped = stripped.trim();

    if let Ok(value) = stripped.parse::<f64>() {
        if value.is_finite() && value >= 0.0 {
            return value;
        }
    }

    first_number(stripped).unwrap_or(0.0)
}

/// First decimal number in a rating label (`Rating: 4.5/5` -> 4.5)
pub fn parse_rating(text: &str) -> f64 {
    match first_number(text) {
        Some(value) if value <= 5.0 => value,
        _ => 0.0,
    }
}

/// Review count from labels such as `(1,234)` or `Reviews: 95`
///
/// Counts too large for `u32` saturate.
pub fn parse_reviews_count(text: &str) -> u32 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

fn first_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Known brand, else the first capitalized word, else `Unknown`
pub fn extract_brand(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some(brand) = brands::KNOWN_BRANDS
        .iter()
        .find(|brand| lower.contains(&brand.to_lowercase()))
    {
        return (*brand).to_string();
    }

    name.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|token| token.chars().next().is_some_and(|c| c.is_alphabetic() && c.is_uppercase()))
        .map_or_else(|| brands::UNKNOWN_BRAND.to_string(), str::to_string)
}

/// Keyword-based coffee type; mixes and capsules are checked before the base forms
pub fn extract_coffee_type(name: &str) -> CoffeeType {
    let lower = name.to_lowercase();

    if contains_any(&lower, &["capsule", "pod"]) {
        CoffeeType::Capsule
    } else if contains_any(&lower, &["mix", "3 in 1", "2 in 1", "3-in-1", "2-in-1"]) {
        CoffeeType::Mix
    } else if contains_any(&lower, &["instant", "powder"]) {
        CoffeeType::Instant
    } else if contains_any(&lower, &["ground", "grind"]) {
        CoffeeType::Ground
    } else if contains_any(&lower, &["bean", "whole"]) {
        CoffeeType::Beans
    } else {
        CoffeeType::Other
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Package size from the first matching size token in the name
pub fn extract_packaging(name: &str) -> Packaging {
    let lower = name.to_lowercase();

    for (pattern, unit, factor) in PACKAGING_PATTERNS.iter() {
        let Some(captures) = pattern.captures(&lower) else {
            continue;
        };
        let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            continue;
        };
        let normalized = (value * factor * 100.0).round() / 100.0;
        return Packaging::new(normalized, unit);
    }

    Packaging::unknown()
}

/// Content fingerprint used for duplicate suppression within a run
pub fn product_fingerprint(name: &str, price: f64) -> String {
    format!("{:x}", md5::compute(format!("{name}|{price}")))
}

/// Classify a scraped listing into a full product record
pub fn build_product(raw: RawListing, source: &str, thresholds: &PriceTierThresholds) -> Product {
    let brand = extract_brand(&raw.name);
    let coffee_type = extract_coffee_type(&raw.name);
    let packaging = extract_packaging(&raw.name);
    let price_tier = thresholds.tier_for(raw.price);

    Product {
        name: raw.name,
        price: raw.price,
        rating: raw.rating,
        reviews_count: raw.reviews_count,
        source: source.to_string(),
        brand,
        coffee_type,
        packaging,
        price_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Rs. 950", 950.0)]
    #[case("PKR1,250", 1250.0)]
    #[case("₨ 450", 450.0)]
    #[case("garbage", 0.0)]
    #[case("Rs. 1,250.00 Rs. 1,500", 1250.0)]
    #[case("", 0.0)]
    #[case("inf", 0.0)]
    fn cleans_price_labels(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(clean_price(text), expected);
    }

    #[rstest]
    #[case(1000.0, PriceTier::Low)]
    #[case(1000.5, PriceTier::Mid)]
    #[case(1001.0, PriceTier::Mid)]
    #[case(2500.0, PriceTier::Mid)]
    #[case(2501.0, PriceTier::Premium)]
    #[case(0.0, PriceTier::Low)]
    fn tier_boundaries_are_inclusive_upper_bounds(#[case] price: f64, #[case] expected: PriceTier) {
        assert_eq!(PriceTierThresholds::default().tier_for(price), expected);
    }

    #[test]
    fn relevance_filter_rejects_accessories() {
        assert!(is_coffee_product("Nescafe Classic Coffee 200g"));
        assert!(!is_coffee_product("Ceramic Coffee Mug Set"));
        assert!(!is_coffee_product("Electric Coffee Grinder"));
        assert!(!is_coffee_product("Basmati Rice 5kg"));
        assert!(!is_coffee_product("Unknown"));
        assert!(is_coffee_product("Lavazza Espresso Beans 1kg"));
    }

    #[test]
    fn packaging_normalizes_units() {
        assert_eq!(extract_packaging("Nescafe Classic 200g"), Packaging::new(200.0, "g"));

        let kilo = extract_packaging("Lavazza Beans 1kg");
        assert_eq!(kilo.value, 1000.0);
        assert_eq!(kilo.unit, "g");
        assert_eq!(kilo.display, "1000g");

        assert_eq!(extract_packaging("Folgers Classic Roast 8oz").display, "226.8g");
        assert_eq!(
            extract_packaging("Coffee 99999999999999999999g").display,
            "100000000000000000000g"
        );
        assert_eq!(extract_packaging("Nescafe 3 in 1 Mix 30 Sticks").display, "30count");
        assert_eq!(extract_packaging("Cold Brew 1.5 litre").display, "1500ml");
        assert_eq!(extract_packaging("Nescafe Gold Blend"), Packaging::unknown());
    }

    #[test]
    fn brand_prefers_known_list_then_capitalized_token() {
        assert_eq!(extract_brand("Nescafe Gold Blend 100g"), "Nescafe");
        assert_eq!(extract_brand("maxwell house original roast"), "Maxwell House");
        assert_eq!(extract_brand("premium Zest Coffee 250g"), "Zest");
        assert_eq!(extract_brand("ground coffee 250g"), "Unknown");
    }

    #[test]
    fn coffee_type_keywords() {
        assert_eq!(extract_coffee_type("Nescafe Classic Instant Coffee"), CoffeeType::Instant);
        assert_eq!(extract_coffee_type("Davidoff Rich Aroma Ground Coffee"), CoffeeType::Ground);
        assert_eq!(extract_coffee_type("Kauphy Italian Roast Coffee Beans"), CoffeeType::Beans);
        assert_eq!(extract_coffee_type("Nescafe Dolce Gusto Capsules"), CoffeeType::Capsule);
        assert_eq!(extract_coffee_type("Nescafe 3 in 1 Instant Coffee Mix"), CoffeeType::Mix);
        assert_eq!(extract_coffee_type("Continental Coffee Powder"), CoffeeType::Instant);
        assert_eq!(extract_coffee_type("Espresso Roast"), CoffeeType::Other);
    }

    #[test]
    fn rating_and_reviews_parse_from_labels() {
        assert_eq!(parse_rating("Rating: 4.5/5"), 4.5);
        assert_eq!(parse_rating("no rating"), 0.0);
        assert_eq!(parse_rating("95"), 0.0);
        assert_eq!(parse_reviews_count("(1,234)"), 1234);
        assert_eq!(parse_reviews_count("Reviews: 95"), 95);
        assert_eq!(parse_reviews_count(""), 0);
        assert_eq!(parse_reviews_count("(12,345,678,901)"), u32::MAX);
    }

    #[test]
    fn fingerprint_depends_on_name_and_price() {
        let a = product_fingerprint("Nescafe Classic 200g", 950.0);
        assert_eq!(a, product_fingerprint("Nescafe Classic 200g", 950.0));
        assert_ne!(a, product_fingerprint("Nescafe Classic 200g", 960.0));
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn build_product_derives_all_fields() {
        let product = build_product(
            RawListing {
                name: "Lavazza Qualita Oro Ground Coffee 250g".to_string(),
                price: 2100.0,
                rating: 4.6,
                reviews_count: 38,
            },
            "naheed.pk",
            &PriceTierThresholds::default(),
        );

        assert_eq!(product.brand, "Lavazza");
        assert_eq!(product.coffee_type, CoffeeType::Ground);
        assert_eq!(product.packaging.display, "250g");
        assert_eq!(product.price_tier, PriceTier::Mid);
        assert_eq!(product.source, "naheed.pk");
    }
}
