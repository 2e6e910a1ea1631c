//! Run metadata and the final collection report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregates::MarketAggregates;
use super::product::Product;

/// Per-page extraction outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    pub page: u32,
    pub url: String,
    pub cards_found: usize,
    /// Product selector that matched, `None` when nothing matched
    pub selector_used: Option<String>,
    pub products_added: usize,
    pub synthetic: bool,
}

/// Per-site extraction outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: String,
    pub source: String,
    pub pages: Vec<PageReport>,
    pub products_added: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteReport {
    pub fn new(site: &str, source: &str) -> Self {
        Self {
            site: site.to_string(),
            source: source.to_string(),
            pages: Vec::new(),
            products_added: 0,
            error: None,
        }
    }

    /// A site succeeds when it contributed at least one product
    pub fn succeeded(&self) -> bool {
        self.products_added > 0
    }

    pub fn used_synthetic_pages(&self) -> bool {
        self.pages.iter().any(|page| page.synthetic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQuality {
    #[serde(rename = "Production data")]
    Production,
    #[serde(rename = "Mixed data")]
    Mixed,
    #[serde(rename = "Sample data")]
    Sample,
}

impl DataQuality {
    /// Label a result set by how many of its products are sample records
    pub fn from_counts(real: usize, sample: usize) -> Self {
        match (real, sample) {
            (0, _) => Self::Sample,
            (_, 0) => Self::Production,
            _ => Self::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Scraped,
    SampleGeneration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub collection_time: DateTime<Utc>,
    pub successful_sites: Vec<String>,
    pub failed_sites: Vec<String>,
    pub total_products: usize,
    pub total_brands: usize,
    pub data_quality: DataQuality,
    pub data_source: DataSource,
    /// Sites where at least one page was synthesized after fetch failures
    pub sample_fallback_sites: Vec<String>,
    pub site_reports: Vec<SiteReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Everything a run produced, ready for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub products: Vec<Product>,
    #[serde(flatten)]
    pub aggregates: MarketAggregates,
    pub metadata: RunMetadata,
}

impl CollectionReport {
    pub fn sample_product_count(&self) -> usize {
        self.products.iter().filter(|product| product.is_sample()).count()
    }
}
