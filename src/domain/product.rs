use serde::{Deserialize, Serialize};
use std::fmt;

/// Source tag carried by every product that was built from synthetic data
pub const SAMPLE_SOURCE: &str = "sample_data";

/// Normalized coffee product scraped from a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub reviews_count: u32,
    pub source: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub coffee_type: CoffeeType,
    pub packaging: Packaging,
    pub price_tier: PriceTier,
}

impl Product {
    /// Whether this record came from a synthesized page or the sample dataset
    pub fn is_sample(&self) -> bool {
        self.source == SAMPLE_SOURCE
    }
}

/// Coffee product category derived from the product name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoffeeType {
    Instant,
    Ground,
    Beans,
    Capsule,
    Mix,
    Other,
}

impl CoffeeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Ground => "ground",
            Self::Beans => "beans",
            Self::Capsule => "capsule",
            Self::Mix => "mix",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CoffeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price segment by fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Low,
    Mid,
    Premium,
}

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [Self::Low, Self::Mid, Self::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package size parsed from the product name
///
/// Weights are normalized to grams and volumes to millilitres, so
/// `1kg` and `1000g` land in the same aggregate bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    pub value: f64,
    pub unit: String,
    pub display: String,
}

impl Packaging {
    pub const UNKNOWN_UNIT: &'static str = "unknown";

    pub fn new(value: f64, unit: &str) -> Self {
        let display = if value.fract() == 0.0 {
            format!("{value:.0}{unit}")
        } else {
            format!("{value}{unit}")
        };
        Self {
            value,
            unit: unit.to_string(),
            display,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: 0.0,
            unit: Self::UNKNOWN_UNIT.to_string(),
            display: Self::UNKNOWN_UNIT.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.unit != Self::UNKNOWN_UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaging_display_drops_fraction_for_whole_values() {
        assert_eq!(Packaging::new(200.0, "g").display, "200g");
        assert_eq!(Packaging::new(226.8, "g").display, "226.8g");
        assert_eq!(Packaging::new(1e20, "g").display, "100000000000000000000g");
    }

    #[test]
    fn product_serializes_with_report_field_names() {
        let product = Product {
            name: "Nescafe Classic 200g".to_string(),
            price: 950.0,
            rating: 0.0,
            reviews_count: 0,
            source: "daraz.pk".to_string(),
            brand: "Nescafe".to_string(),
            coffee_type: CoffeeType::Instant,
            packaging: Packaging::new(200.0, "g"),
            price_tier: PriceTier::Low,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "instant");
        assert_eq!(json["price_tier"], "low");
        assert_eq!(json["packaging"]["display"], "200g");
        assert!(json.get("coffee_type").is_none());
        assert!(!product.is_sample());
    }
}
