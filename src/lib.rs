//! Coffee Market Collector - coffee product scraping for Pakistani e-commerce sites
//!
//! Collects coffee listings from a configurable table of shops, classifies
//! each product by brand, type, packaging and price tier, aggregates market
//! statistics and exports JSON and CSV reports.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::{CoffeeMarketCollector, CollectOptions, SampleFallback};
pub use domain::{CollectionReport, Product, SiteConfig};
pub use infrastructure::{AppConfig, ConfigManager, PageFetcher, ReportExporter, ResponseCache};
