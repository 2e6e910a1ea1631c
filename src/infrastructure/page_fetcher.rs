//! Page fetcher: cache, then transport with retries, then labeled sample page
//!
//! The fetcher picks the plain HTTP transport or the headless browser per
//! request. Transport failures are retried with exponential backoff plus
//! jitter. Once the budget is spent the fetcher either synthesizes a marked
//! sample page or reports the failure, depending on configuration.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infrastructure::config::{AppConfig, BrowserConfig, HttpConfig};
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::response_cache::ResponseCache;
use crate::infrastructure::sample_data;

/// Something that can turn a URL into page HTML in one attempt
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    async fn fetch_page(&self, url: &str) -> FetchResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    Cache,
    Network,
    Browser,
    Sample,
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    pub origin: PageOrigin,
    /// Content is synthesized sample data, possibly served from cache
    pub synthetic: bool,
}

/// Attempt budget and backoff shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_jitter: Duration::from_millis(config.backoff_jitter_ms),
        }
    }

    /// Retry without waiting, for tests and offline runs
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::ZERO,
            backoff_jitter: Duration::ZERO,
        }
    }

    /// `base * 2^(attempt-1)` plus a random jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = self.backoff_base.saturating_mul(1 << exponent);
        let jitter_ms = u64::try_from(self.backoff_jitter.as_millis()).unwrap_or(u64::MAX);
        backoff + Duration::from_millis(fastrand::u64(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// Headless browser transport when the crate was built with it
#[cfg(feature = "browser")]
pub fn browser_transport(config: &BrowserConfig) -> Option<Arc<dyn PageTransport>> {
    Some(Arc::new(crate::infrastructure::browser::HeadlessBrowser::new(
        config.clone(),
    )))
}

#[cfg(not(feature = "browser"))]
pub fn browser_transport(_config: &BrowserConfig) -> Option<Arc<dyn PageTransport>> {
    None
}

pub struct PageFetcher {
    cache: ResponseCache,
    http: Arc<dyn PageTransport>,
    browser: Option<Arc<dyn PageTransport>>,
    retry: RetryPolicy,
    synthesize_on_failure: bool,
    browser_warning_logged: AtomicBool,
}

impl PageFetcher {
    pub fn new(cache: ResponseCache, http: Arc<dyn PageTransport>, retry: RetryPolicy) -> Self {
        Self {
            cache,
            http,
            browser: None,
            retry,
            synthesize_on_failure: true,
            browser_warning_logged: AtomicBool::new(false),
        }
    }

    /// Fetcher wired with the real HTTP client and, if compiled in, the browser
    pub fn from_config(config: &AppConfig, cache: ResponseCache) -> Result<Self> {
        let http = Arc::new(HttpClient::with_config(&config.http)?);
        Ok(Self::new(cache, http, RetryPolicy::from_config(&config.http))
            .with_browser(browser_transport(&config.browser))
            .with_synthesis(config.collector.synthesize_on_failure))
    }

    pub fn with_browser(mut self, browser: Option<Arc<dyn PageTransport>>) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_synthesis(mut self, enabled: bool) -> Self {
        self.synthesize_on_failure = enabled;
        self
    }

    /// Fetch with the configured retry budget
    pub async fn fetch(&self, url: &str, render: bool) -> FetchResult<FetchedPage> {
        self.fetch_with_retries(url, render, self.retry.max_retries).await
    }

    pub async fn fetch_with_retries(
        &self,
        url: &str,
        render: bool,
        retries: u32,
    ) -> FetchResult<FetchedPage> {
        if let Some(entry) = self.cache.get(url).await {
            return Ok(FetchedPage {
                url: url.to_string(),
                html: entry.content,
                origin: PageOrigin::Cache,
                synthetic: entry.synthetic,
            });
        }

        let (transport, origin) = self.transport_for(render);
        let attempts = retries.max(1);
        info!("Fetching {} (using {})", url, transport.name());

        let mut last_error = None;
        for attempt in 1..=attempts {
            match transport.fetch_page(url).await {
                Ok(html) => {
                    debug!("Fetched {} on attempt {}/{}", url, attempt, attempts);
                    self.cache.put(url, &html, false).await;
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        html,
                        origin,
                        synthetic: false,
                    });
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    let retryable = e.is_retryable();
                    last_error = Some(e);

                    if !retryable {
                        break;
                    }
                    if attempt < attempts {
                        let delay = self.retry.delay_for(attempt);
                        debug!("Backing off {:?} before retrying {}", delay, url);
                        sleep(delay).await;
                    }
                }
            }
        }

        let last_error = last_error.map_or_else(String::new, |e| e.to_string());

        if !self.synthesize_on_failure {
            return Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts,
                last_error,
            });
        }

        warn!("⚠️ Generating labeled sample page for {} after {} failed attempts", url, attempts);
        let html = sample_data::synthetic_page(url);
        self.cache.put(url, &html, true).await;
        Ok(FetchedPage {
            url: url.to_string(),
            html,
            origin: PageOrigin::Sample,
            synthetic: true,
        })
    }

    fn transport_for(&self, render: bool) -> (&Arc<dyn PageTransport>, PageOrigin) {
        if !render {
            return (&self.http, PageOrigin::Network);
        }

        match &self.browser {
            Some(browser) => (browser, PageOrigin::Browser),
            None => {
                if !self.browser_warning_logged.swap(true, Ordering::Relaxed) {
                    warn!("⚠️ Browser rendering requested but not available in this build, using plain HTTP");
                }
                (&self.http, PageOrigin::Network)
            }
        }
    }
}
