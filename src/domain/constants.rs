//! Market domain constants
//!
//! Keyword tables used for relevance filtering and product classification,
//! plus the default price tier thresholds.

/// Coffee relevance filter
pub mod relevance {
    /// A product name must contain at least one of these (lowercase match)
    pub const COFFEE_KEYWORDS: &[&str] = &[
        "coffee", "café", "cafe", "caffè", "kaffee", "nescafe", "espresso", "cappuccino",
        "latte", "mocha", "americano", "java", "brew", "arabica", "robusta", "decaf",
        "coffeehouse", "coffeeshop", "kopi", "kahwa", "قہوہ", "کافی", "barista",
        "french press", "turkish coffee", "iced coffee", "coffee bean", "cold brew",
        "coffee grounds", "instant coffee",
    ];

    /// Accessories that mention coffee but are not coffee
    pub const EXCLUDED_PHRASES: &[&str] = &[
        "mug",
        "coffee maker",
        "coffee machine",
        "grinder",
        "coffee table",
        "frother",
    ];
}

/// Brand recognition
pub mod brands {
    /// Brands commonly sold in Pakistan. Order matters: the first hit wins.
    pub const KNOWN_BRANDS: &[&str] = &[
        "Nescafe", "Nestle", "Lavazza", "Davidoff", "Jacobs", "Maxwell House", "Folgers",
        "Mehran", "National", "Tapal", "Koffee Kult", "MacCoffee", "CafeCoffeeDay", "Kenco",
        "Dallah", "Gloria Jeans", "Second Cup", "Illy", "Coffeewalla", "Urban Coffee", "Mocca",
        "Café de Colombia", "Café du Monde", "Café Puro", "Café Direct", "Café Royal",
        "Café Noir", "Café Brazil", "Coffee Planet", "Coffee Beanery", "Coffee Republic",
        "Kraft Foods", "Sadaf Coffee", "Raven", "Arkadia", "Continental", "Kauphy",
        "Starbucks",
    ];

    pub const UNKNOWN_BRAND: &str = "Unknown";
}

/// Default price tier boundaries in PKR (upper bounds are inclusive)
pub mod pricing {
    pub const LOW_TIER_MAX: f64 = 1000.0;
    pub const MID_TIER_MAX: f64 = 2500.0;
}

/// Placeholder used when no name selector matched
pub const UNKNOWN_NAME: &str = "Unknown";
