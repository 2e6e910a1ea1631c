//! Domain module - coffee market model and classification rules
//!
//! Product records, the derivation rules that classify them, incremental
//! aggregates, the site configuration table and the run report. Nothing in
//! here performs I/O.

pub mod aggregates;
pub mod classification;
pub mod constants;
pub mod product;
pub mod report;
pub mod sites;

pub use aggregates::{BrandStats, MarketAggregates, PriceSummary, TypeStats};
pub use classification::{build_product, is_coffee_product, PriceTierThresholds, RawListing};
pub use product::{CoffeeType, Packaging, PriceTier, Product, SAMPLE_SOURCE};
pub use report::{CollectionReport, DataQuality, DataSource, PageReport, RunMetadata, SiteReport};
pub use sites::{default_sites, AlternativeSelectors, PaginationStyle, SiteConfig, SiteQuirks};
