//! HTTP client for listing pages
//!
//! Plain GET requests with a per-request timeout, browser-like headers and a
//! user agent picked at random from the configured set on every request.
//! Retries live in the page fetcher; this client makes exactly one attempt.

#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info};

use crate::infrastructure::config::{defaults, HttpConfig};
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::page_fetcher::PageTransport;

/// HTTP client with rotating user agents
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agents: Vec<String>,
}

impl HttpClient {
    /// Create a new HTTP client from the `http` configuration section
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        let user_agents = if config.user_agents.is_empty() {
            defaults::USER_AGENTS.iter().map(|ua| (*ua).to_string()).collect()
        } else {
            config.user_agents.clone()
        };

        Ok(Self {
            client,
            user_agents,
        })
    }

    /// Random user agent from the configured set
    pub fn pick_user_agent(&self) -> &str {
        let index = fastrand::usize(..self.user_agents.len());
        &self.user_agents[index]
    }

    /// Single attempt to fetch HTML content as a string
    pub async fn fetch_html_string(&self, url: &str) -> FetchResult<String> {
        let user_agent = self.pick_user_agent();
        info!("🌐 HTTP GET: {}", url);
        debug!("User agent: {}", user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html_content = response
            .text()
            .await
            .map_err(|e| FetchError::request(url, format!("failed to read response body: {}", e)))?;

        if html_content.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(html_content)
    }
}

#[async_trait]
impl PageTransport for HttpClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        self.fetch_html_string(url).await
    }
}
