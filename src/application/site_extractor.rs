//! Generic per-site extraction
//!
//! One routine serves every shop. The differences between shops live in
//! [`SiteConfig`]: selectors with their fallbacks, the pagination style and
//! whether the page needs a browser. Pages are visited in order until the
//! budget is spent or a page contributes nothing new.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::collection_context::CollectionContext;
use super::collector_error::{CollectorError, CollectorResult};
use super::pagination::page_url;
use crate::domain::classification::{build_product, is_coffee_product};
use crate::domain::product::SAMPLE_SOURCE;
use crate::domain::report::{PageReport, SiteReport};
use crate::domain::sites::SiteConfig;
use crate::infrastructure::config::DelayRange;
use crate::infrastructure::page_fetcher::PageFetcher;
use crate::infrastructure::parsing::{ListingParser, ParsedPage, ParsingError};
use crate::infrastructure::sample_data;

pub struct SiteExtractor {
    fetcher: Arc<PageFetcher>,
    page_delay: DelayRange,
    debug_dir: PathBuf,
}

impl SiteExtractor {
    pub fn new(fetcher: Arc<PageFetcher>, debug_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            page_delay: DelayRange::none(),
            debug_dir: debug_dir.into(),
        }
    }

    pub fn with_page_delay(mut self, page_delay: DelayRange) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Extract up to `page_budget` pages of one site into `context`
    ///
    /// Never fails: a site-level error ends pagination and is recorded in
    /// the returned report.
    pub async fn extract(
        &self,
        site: &SiteConfig,
        page_budget: u32,
        context: &mut CollectionContext,
    ) -> SiteReport {
        let mut report = SiteReport::new(&site.name, &site.source);

        if let Err(e) = self.extract_pages(site, page_budget, context, &mut report).await {
            warn!("⚠️ [{}] Extraction stopped: {}", site.name, e);
            report.error = Some(e.to_string());
        }

        info!(
            "[{}] {} products from {} pages",
            site.name,
            report.products_added,
            report.pages.len()
        );
        report
    }

    async fn extract_pages(
        &self,
        site: &SiteConfig,
        page_budget: u32,
        context: &mut CollectionContext,
        report: &mut SiteReport,
    ) -> CollectorResult<()> {
        let parsers = PageParsers::for_site(site)?;

        for page in 1..=page_budget {
            if page > 1 {
                sleep(self.page_delay.sample()).await;
            }

            let url = page_url(&site.search_url, page, site.quirks.pagination);
            let fetched = self.fetcher.fetch(&url, site.requires_browser).await?;
            let synthetic = fetched.synthetic;

            if page == 1 && site.quirks.save_debug_html && !synthetic {
                match self.save_debug_snapshot(site, &fetched.html).await {
                    Ok(path) => debug!("[{}] Saved debug snapshot to {:?}", site.name, path),
                    Err(e) => warn!("[{}] Could not save debug snapshot: {}", site.name, e),
                }
            }

            let (active, source) = parsers.select(synthetic);
            let parsed = active.parse_page(&fetched.html);

            if parsed.cards_found() == 0 {
                warn!(
                    "[{}] {}",
                    site.name,
                    ParsingError::no_products_found(&url, active.product_selectors())
                );
            }

            let page_report = record_page(site, page, &url, parsed, source, synthetic, context)?;
            let added = page_report.products_added;
            report.products_added += added;
            report.pages.push(page_report);

            if added == 0 {
                debug!("[{}] Page {} added nothing new, stopping", site.name, page);
                break;
            }
        }

        Ok(())
    }

    async fn save_debug_snapshot(&self, site: &SiteConfig, html: &str) -> CollectorResult<PathBuf> {
        fs::create_dir_all(&self.debug_dir).await?;
        let path = debug_snapshot_path(&self.debug_dir, &site.name);
        fs::write(&path, html).await?;
        Ok(path)
    }
}

/// The site's own parser plus the one that reads synthesized pages
struct PageParsers {
    site: ListingParser,
    sample: ListingParser,
    source: String,
}

impl PageParsers {
    fn for_site(site: &SiteConfig) -> CollectorResult<Self> {
        let parser = ListingParser::for_site(site).map_err(|e| CollectorError::InvalidSiteConfig {
            site: site.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            site: parser,
            sample: ListingParser::for_site(&sample_data::sample_profile(site))?,
            source: site.source.clone(),
        })
    }

    /// Parser and product source for a page, by the fetcher's synthetic flag
    fn select(&self, synthetic: bool) -> (&ListingParser, &str) {
        if synthetic {
            (&self.sample, SAMPLE_SOURCE)
        } else {
            (&self.site, self.source.as_str())
        }
    }
}

pub fn debug_snapshot_path(debug_dir: &Path, site: &str) -> PathBuf {
    debug_dir.join(format!("{}_debug.html", site))
}

/// Classify and record every card of one parsed page
///
/// Card-level errors skip the card; anything else ends the site.
fn record_page(
    site: &SiteConfig,
    page: u32,
    url: &str,
    parsed: ParsedPage,
    source: &str,
    synthetic: bool,
    context: &mut CollectionContext,
) -> CollectorResult<PageReport> {
    let cards_found = parsed.cards_found();
    let mut products_added = 0;

    for card in parsed.cards {
        let raw = match card {
            Ok(raw) => raw,
            Err(e) if e.is_recoverable() => {
                warn!("[{}] Skipping card on page {}: {}", site.name, page, e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !is_coffee_product(&raw.name) {
            debug!("[{}] Not a coffee product: {}", site.name, raw.name);
            continue;
        }

        let product = build_product(raw, source, context.thresholds());
        let name = product.name.clone();
        if context.record(product) {
            products_added += 1;
        } else {
            debug!("[{}] Duplicate skipped: {}", site.name, name);
        }
    }

    Ok(PageReport {
        page,
        url: url.to_string(),
        cards_found,
        selector_used: parsed.selector_used,
        products_added,
        synthetic,
    })
}
