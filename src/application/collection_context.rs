//! Mutable state shared by every site extraction in one run

use std::collections::HashSet;

use crate::domain::aggregates::MarketAggregates;
use crate::domain::classification::{product_fingerprint, PriceTierThresholds};
use crate::domain::product::Product;

/// Collected products, their running aggregates and the dedup set
#[derive(Debug, Default)]
pub struct CollectionContext {
    thresholds: PriceTierThresholds,
    products: Vec<Product>,
    aggregates: MarketAggregates,
    seen: HashSet<String>,
}

impl CollectionContext {
    pub fn new(thresholds: PriceTierThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn thresholds(&self) -> &PriceTierThresholds {
        &self.thresholds
    }

    /// Add a product unless one with the same name and price was already recorded
    ///
    /// Returns whether the product was added.
    pub fn record(&mut self, product: Product) -> bool {
        if !self.seen.insert(product_fingerprint(&product.name, product.price)) {
            return false;
        }

        self.aggregates.fold(&product);
        self.products.push(product);
        true
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn aggregates(&self) -> &MarketAggregates {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn sample_product_count(&self) -> usize {
        self.products.iter().filter(|product| product.is_sample()).count()
    }

    pub fn into_parts(self) -> (Vec<Product>, MarketAggregates) {
        (self.products, self.aggregates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::{build_product, RawListing};

    fn product(name: &str, price: f64) -> Product {
        build_product(
            RawListing {
                name: name.to_string(),
                price,
                rating: 0.0,
                reviews_count: 0,
            },
            "daraz.pk",
            &PriceTierThresholds::default(),
        )
    }

    #[test]
    fn identical_name_and_price_are_kept_once() {
        let mut context = CollectionContext::default();
        assert!(context.record(product("Nescafe Classic Coffee 200g", 950.0)));
        assert!(!context.record(product("Nescafe Classic Coffee 200g", 950.0)));
        assert_eq!(context.len(), 1);
        assert_eq!(context.aggregates().product_count(), 1);
    }

    #[test]
    fn same_name_with_different_price_is_kept_twice() {
        let mut context = CollectionContext::default();
        assert!(context.record(product("Nescafe Classic Coffee 200g", 950.0)));
        assert!(context.record(product("Nescafe Classic Coffee 200g", 990.0)));
        assert_eq!(context.len(), 2);
        assert_eq!(context.aggregates().brands["Nescafe"].summary.count, 2);
    }

    #[test]
    fn into_parts_keeps_insertion_order() {
        let mut context = CollectionContext::default();
        context.record(product("Lavazza Oro Coffee 250g", 2100.0));
        context.record(product("Mehran Instant Coffee 50g", 450.0));

        let (products, aggregates) = context.into_parts();
        assert_eq!(products[0].brand, "Lavazza");
        assert_eq!(products[1].brand, "Mehran");
        assert_eq!(aggregates.brands.len(), 2);
    }
}
