//! Incremental market statistics
//!
//! Brand, coffee type, packaging and price tier buckets that are updated as
//! each product is folded in. Counts and running averages always reflect
//! exactly the records folded so far.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::product::{CoffeeType, PriceTier, Product};

/// Count plus running average of a price series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub count: u32,
    pub avg_price: f64,
    pub total_price: f64,
}

impl PriceSummary {
    fn record(&mut self, price: f64) {
        self.count += 1;
        self.total_price += price;
        self.avg_price = self.total_price / f64::from(self.count);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandStats {
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub types: BTreeSet<CoffeeType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStats {
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub brands: BTreeSet<String>,
}

/// Aggregate buckets for one collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAggregates {
    pub brands: BTreeMap<String, BrandStats>,
    pub types: BTreeMap<CoffeeType, TypeStats>,
    /// Keyed by packaging display string; products of unknown size are not counted
    pub packaging: BTreeMap<String, PriceSummary>,
    pub price_tiers: BTreeMap<PriceTier, Vec<Product>>,
}

impl Default for MarketAggregates {
    fn default() -> Self {
        Self {
            brands: BTreeMap::new(),
            types: BTreeMap::new(),
            packaging: BTreeMap::new(),
            price_tiers: PriceTier::ALL.iter().map(|tier| (*tier, Vec::new())).collect(),
        }
    }
}

impl MarketAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one product into every bucket it belongs to
    pub fn fold(&mut self, product: &Product) {
        let brand = self.brands.entry(product.brand.clone()).or_default();
        brand.summary.record(product.price);
        brand.types.insert(product.coffee_type);

        let coffee_type = self.types.entry(product.coffee_type).or_default();
        coffee_type.summary.record(product.price);
        coffee_type.brands.insert(product.brand.clone());

        if product.packaging.is_known() {
            self.packaging
                .entry(product.packaging.display.clone())
                .or_default()
                .record(product.price);
        }

        self.price_tiers
            .entry(product.price_tier)
            .or_default()
            .push(product.clone());
    }

    /// Total products folded in, counted through the tier lists
    pub fn product_count(&self) -> usize {
        self.price_tiers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::{build_product, PriceTierThresholds, RawListing};
    use proptest::prelude::*;

    fn product(name: &str, price: f64) -> Product {
        build_product(
            RawListing {
                name: name.to_string(),
                price,
                rating: 0.0,
                reviews_count: 0,
            },
            "test",
            &PriceTierThresholds::default(),
        )
    }

    #[test]
    fn fold_updates_every_bucket() {
        let mut aggregates = MarketAggregates::new();
        aggregates.fold(&product("Nescafe Classic Instant Coffee 200g", 950.0));
        aggregates.fold(&product("Nescafe Gold Blend Instant Coffee 100g", 1250.0));
        aggregates.fold(&product("Lavazza Ground Coffee", 2600.0));

        let nescafe = &aggregates.brands["Nescafe"];
        assert_eq!(nescafe.summary.count, 2);
        assert!((nescafe.summary.avg_price - 1100.0).abs() < f64::EPSILON);
        assert!(nescafe.types.contains(&CoffeeType::Instant));

        let instant = &aggregates.types[&CoffeeType::Instant];
        assert_eq!(instant.summary.count, 2);
        assert!(instant.brands.contains("Nescafe"));

        assert_eq!(aggregates.packaging.len(), 2);
        assert!(!aggregates.packaging.contains_key("unknown"));

        assert_eq!(aggregates.price_tiers[&PriceTier::Low].len(), 1);
        assert_eq!(aggregates.price_tiers[&PriceTier::Mid].len(), 1);
        assert_eq!(aggregates.price_tiers[&PriceTier::Premium].len(), 1);
        assert_eq!(aggregates.product_count(), 3);
    }

    #[test]
    fn sets_serialize_as_sorted_lists() {
        let mut aggregates = MarketAggregates::new();
        aggregates.fold(&product("Mehran Instant Coffee 50g", 450.0));
        aggregates.fold(&product("Davidoff Ground Coffee 250g", 2350.0));
        aggregates.fold(&product("Continental Coffee Powder 100g", 750.0));

        let json = serde_json::to_value(&aggregates).unwrap();
        let brands = json["types"]["instant"]["brands"].as_array().unwrap();
        assert_eq!(brands, &vec![serde_json::json!("Continental"), serde_json::json!("Mehran")]);
        assert_eq!(json["brands"]["Davidoff"]["count"], 1);
        assert!(json["price_tiers"]["premium"].as_array().unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn counts_and_averages_stay_consistent(prices in prop::collection::vec(0.0f64..10_000.0, 1..40)) {
            let mut aggregates = MarketAggregates::new();
            for (i, price) in prices.iter().enumerate() {
                let name = if i % 2 == 0 { "Nescafe Instant Coffee 200g" } else { "Lavazza Beans 1kg" };
                aggregates.fold(&product(name, *price));
            }

            let brand_total: u32 = aggregates.brands.values().map(|b| b.summary.count).sum();
            let type_total: u32 = aggregates.types.values().map(|t| t.summary.count).sum();
            prop_assert_eq!(brand_total as usize, prices.len());
            prop_assert_eq!(type_total as usize, prices.len());
            prop_assert_eq!(aggregates.product_count(), prices.len());

            for stats in aggregates.brands.values() {
                let expected = stats.summary.total_price / f64::from(stats.summary.count);
                prop_assert!((stats.summary.avg_price - expected).abs() < 1e-9);
            }
        }
    }
}
