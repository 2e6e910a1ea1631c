//! Application layer module
//!
//! Drives a collection run: builds page URLs, extracts each site into a
//! shared context and assembles the final report.

pub mod collection_context;
pub mod collector_error;
pub mod orchestrator;
pub mod pagination;
pub mod site_extractor;

pub use collection_context::CollectionContext;
pub use collector_error::{CollectorError, CollectorResult};
pub use orchestrator::{CoffeeMarketCollector, CollectOptions, SampleFallback};
pub use pagination::page_url;
pub use site_extractor::SiteExtractor;
