//! Multi-site collection run
//!
//! Sites are processed one after another in table order. A failing site is
//! recorded and skipped. The final report carries the products, the
//! aggregates and metadata that says how much of the data is real.

#![allow(clippy::uninlined_format_args)]

use chrono::Utc;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use super::collection_context::CollectionContext;
use super::site_extractor::SiteExtractor;
use crate::domain::classification::PriceTierThresholds;
use crate::domain::report::{CollectionReport, DataQuality, DataSource, RunMetadata, SiteReport};
use crate::domain::sites::SiteConfig;
use crate::infrastructure::config::{AppConfig, CollectorConfig, DelayRange};
use crate::infrastructure::page_fetcher::PageFetcher;
use crate::infrastructure::sample_data;

pub const ALL_SITES_FAILED_NOTE: &str =
    "All sites failed; products are the built-in sample dataset, not market observations";

pub const PARTIAL_SAMPLE_NOTE: &str =
    "Some pages could not be fetched and were replaced by labeled sample data";

/// What to do when no site yields any product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SampleFallback {
    /// Report an empty result
    #[default]
    Disabled,
    /// Fold in the labeled sample dataset
    WhenAllSitesFail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    pub max_sites: Option<usize>,
    pub page_budget: u32,
    pub sample_fallback: SampleFallback,
}

impl CollectOptions {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            max_sites: config.max_sites,
            page_budget: config.page_budget,
            sample_fallback: SampleFallback::Disabled,
        }
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::from_config(&CollectorConfig::default())
    }
}

pub struct CoffeeMarketCollector {
    sites: Vec<SiteConfig>,
    extractor: SiteExtractor,
    site_delay: DelayRange,
    thresholds: PriceTierThresholds,
}

impl CoffeeMarketCollector {
    /// Collector without politeness delays
    pub fn new(sites: Vec<SiteConfig>, extractor: SiteExtractor, thresholds: PriceTierThresholds) -> Self {
        Self {
            sites,
            extractor,
            site_delay: DelayRange::none(),
            thresholds,
        }
    }

    /// Collector wired from the configuration file
    pub fn from_config(config: &AppConfig, fetcher: Arc<PageFetcher>) -> Self {
        let extractor = SiteExtractor::new(fetcher, &config.collector.debug_dir)
            .with_page_delay(config.collector.page_delay_ms);
        Self::new(config.sites.clone(), extractor, config.pricing)
            .with_site_delay(config.collector.site_delay_ms)
    }

    pub fn with_site_delay(mut self, site_delay: DelayRange) -> Self {
        self.site_delay = site_delay;
        self
    }

    /// Run every configured site and build the report
    pub async fn collect(&self, options: &CollectOptions) -> CollectionReport {
        let collection_time = Utc::now();
        let limit = options.max_sites.unwrap_or(self.sites.len());
        let sites: Vec<&SiteConfig> = self.sites.iter().take(limit).collect();

        info!("🚀 Collecting coffee products from {} sites", sites.len());

        let mut context = CollectionContext::new(self.thresholds);
        let mut site_reports = Vec::with_capacity(sites.len());

        for (index, site) in sites.iter().enumerate() {
            if index > 0 {
                sleep(self.site_delay.sample()).await;
            }

            info!("🌐 [{}/{}] Collecting from {}", index + 1, sites.len(), site.name);
            let report = self.extractor.extract(site, options.page_budget, &mut context).await;

            if report.succeeded() {
                info!("✅ {}: {} products", site.name, report.products_added);
            } else {
                warn!("⚠️ {}: no products collected", site.name);
            }
            site_reports.push(report);
        }

        let successful_sites = site_names(&site_reports, SiteReport::succeeded);
        let failed_sites = site_names(&site_reports, |report| !report.succeeded());
        let sample_fallback_sites = site_names(&site_reports, SiteReport::used_synthetic_pages);

        let mut data_source = DataSource::Scraped;
        let mut note = (!sample_fallback_sites.is_empty()).then(|| PARTIAL_SAMPLE_NOTE.to_string());

        if successful_sites.is_empty() {
            warn!("⚠️ All {} sites failed to yield products", site_reports.len());

            if options.sample_fallback == SampleFallback::WhenAllSitesFail {
                warn!("Using the labeled sample dataset");
                for product in sample_data::sample_products(&self.thresholds) {
                    context.record(product);
                }
                data_source = DataSource::SampleGeneration;
                note = Some(ALL_SITES_FAILED_NOTE.to_string());
            }
        }

        let sample_count = context.sample_product_count();
        let data_quality = DataQuality::from_counts(context.len() - sample_count, sample_count);
        let (products, aggregates) = context.into_parts();

        info!(
            "📊 Collected {} products across {} brands ({:?})",
            products.len(),
            aggregates.brands.len(),
            data_quality
        );

        CollectionReport {
            metadata: RunMetadata {
                collection_time,
                successful_sites,
                failed_sites,
                total_products: products.len(),
                total_brands: aggregates.brands.len(),
                data_quality,
                data_source,
                sample_fallback_sites,
                site_reports,
                note,
            },
            products,
            aggregates,
        }
    }
}

fn site_names(reports: &[SiteReport], keep: impl Fn(&SiteReport) -> bool) -> Vec<String> {
    reports
        .iter()
        .filter(|&report| keep(report))
        .map(|report| report.site.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fetch_error::{FetchError, FetchResult};
    use crate::infrastructure::page_fetcher::{PageTransport, RetryPolicy};
    use crate::infrastructure::response_cache::ResponseCache;
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl PageTransport for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn fetch_page(&self, url: &str) -> FetchResult<String> {
            Err(FetchError::request(url, "network unreachable"))
        }
    }

    fn collector(synthesize: bool) -> CoffeeMarketCollector {
        let fetcher = PageFetcher::new(ResponseCache::disabled(), Arc::new(Offline), RetryPolicy::immediate(1))
            .with_synthesis(synthesize);
        let extractor = SiteExtractor::new(Arc::new(fetcher), "unused-debug-dir");
        CoffeeMarketCollector::new(
            crate::domain::sites::default_sites(),
            extractor,
            PriceTierThresholds::default(),
        )
    }

    fn options(sample_fallback: SampleFallback) -> CollectOptions {
        CollectOptions {
            max_sites: Some(2),
            page_budget: 2,
            sample_fallback,
        }
    }

    #[tokio::test]
    async fn all_failed_sites_yield_empty_labeled_result() {
        let report = collector(false).collect(&options(SampleFallback::Disabled)).await;

        assert!(report.products.is_empty());
        assert!(report.metadata.successful_sites.is_empty());
        assert_eq!(report.metadata.failed_sites, ["daraz", "alfatah"]);
        assert_eq!(report.metadata.data_quality, DataQuality::Sample);
        assert_eq!(report.metadata.data_source, DataSource::Scraped);
        assert!(report.metadata.note.is_none());
    }

    #[tokio::test]
    async fn opt_in_fallback_folds_sample_dataset() {
        let report = collector(false).collect(&options(SampleFallback::WhenAllSitesFail)).await;

        assert_eq!(report.metadata.total_products, 10);
        assert_eq!(report.metadata.data_source, DataSource::SampleGeneration);
        assert_eq!(report.metadata.note.as_deref(), Some(ALL_SITES_FAILED_NOTE));
        assert_eq!(report.sample_product_count(), 10);
    }

    #[tokio::test]
    async fn synthesized_pages_are_reported_per_site() {
        let report = collector(true).collect(&options(SampleFallback::Disabled)).await;

        // the second site only repeats the sample products, so it adds nothing
        assert_eq!(report.metadata.successful_sites, ["daraz"]);
        assert_eq!(report.metadata.failed_sites, ["alfatah"]);
        assert_eq!(report.metadata.sample_fallback_sites, ["daraz", "alfatah"]);
        assert_eq!(report.metadata.data_quality, DataQuality::Sample);
        assert_eq!(report.metadata.note.as_deref(), Some(PARTIAL_SAMPLE_NOTE));
    }

    #[tokio::test]
    async fn max_sites_caps_the_run() {
        let mut options = options(SampleFallback::Disabled);
        options.max_sites = Some(1);

        let report = collector(false).collect(&options).await;
        assert_eq!(report.metadata.site_reports.len(), 1);
    }
}
