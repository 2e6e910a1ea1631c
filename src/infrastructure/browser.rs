//! Headless Chrome transport for JavaScript-rendered listing pages
//!
//! Compiled only with the `browser` feature. The Chrome session is blocking,
//! so each fetch runs on the blocking pool and is awaited before the caller
//! moves on.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::infrastructure::config::BrowserConfig;
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::page_fetcher::PageTransport;

const SCROLL_FRACTIONS: [&str; 2] = ["1 / 3", "2 / 3"];

#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    config: BrowserConfig,
}

impl HeadlessBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Start Chrome; failure here means no usable browser on this machine
    fn launch(config: &BrowserConfig) -> FetchResult<Browser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some(config.window_size))
            .build()
            .map_err(|e| {
                warn!("Invalid browser launch options: {}", e);
                FetchError::BrowserUnavailable
            })?;

        Browser::new(launch_options).map_err(|e| {
            warn!("⚠️ Could not launch headless Chrome: {}", e);
            FetchError::BrowserUnavailable
        })
    }

    /// Load the page, let lazy content render, dismiss consent dialogs, return the DOM
    fn render_blocking(browser: &Browser, config: &BrowserConfig, url: &str) -> Result<String> {
        let tab = browser.new_tab()?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        sleep(Duration::from_millis(config.render_wait_ms));

        for fraction in SCROLL_FRACTIONS {
            tab.evaluate(
                &format!("window.scrollTo(0, document.body.scrollHeight * {});", fraction),
                false,
            )?;
            sleep(Duration::from_millis(config.scroll_pause_ms));
        }

        if Self::dismiss_consent(&tab, &config.consent_texts)? {
            info!("Closed consent dialog on {}", url);
            sleep(Duration::from_millis(config.scroll_pause_ms));
        }

        Ok(tab.get_content()?)
    }

    /// Click the first button whose text contains one of the consent labels
    fn dismiss_consent(tab: &headless_chrome::Tab, consent_texts: &[String]) -> Result<bool> {
        if consent_texts.is_empty() {
            return Ok(false);
        }

        let labels = serde_json::to_string(consent_texts)?;
        let script = format!(
            r"(() => {{
                const labels = {};
                for (const button of document.querySelectorAll('button')) {{
                    const text = button.textContent || '';
                    if (labels.some((label) => text.includes(label))) {{
                        button.click();
                        return true;
                    }}
                }}
                return false;
            }})()",
            labels
        );

        let result = tab.evaluate(&script, false)?;
        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

#[async_trait]
impl PageTransport for HeadlessBrowser {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        info!("🧭 Rendering with headless Chrome: {}", url);
        let config = self.config.clone();
        let target = url.to_string();

        let html = tokio::task::spawn_blocking(move || {
            let browser = Self::launch(&config)?;
            Self::render_blocking(&browser, &config, &target).map_err(|e| FetchError::browser(&target, e))
        })
        .await
        .map_err(|e| FetchError::browser(url, e))??;

        if html.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!("Rendered {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
