//! Disk-backed response cache
//!
//! One JSON file per URL, named by the MD5 hex digest of the URL. Entries are
//! only served while younger than the TTL. Every I/O or decode failure is
//! logged and reported as a miss so the cache can never stop a collection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::infrastructure::config::CacheConfig;

/// Stored page snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    /// Page was synthesized from sample data rather than fetched
    pub synthetic: bool,
    pub content: String,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.timestamp) < ttl
    }
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    directory: PathBuf,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            ttl,
            enabled: true,
        }
    }

    /// A cache that never reads or writes
    pub fn disabled() -> Self {
        Self {
            directory: PathBuf::new(),
            ttl: Duration::zero(),
            enabled: false,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(&config.directory, config.ttl())
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// MD5 hex digest of the URL
    pub fn cache_key(url: &str) -> String {
        format!("{:x}", md5::compute(url.as_bytes()))
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.directory.join(format!("{}.json", Self::cache_key(url)))
    }

    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        self.get_at(url, Utc::now()).await
    }

    /// Fresh entry for `url` as seen at `now`
    pub async fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }

        let path = self.entry_path(url);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("⚠️ Cache read failed for {} ({:?}): {}", url, path, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("⚠️ Cache entry {:?} is unreadable: {}", path, e);
                return None;
            }
        };

        if entry.url != url {
            warn!("⚠️ Cache entry {:?} belongs to {}, ignoring", path, entry.url);
            return None;
        }

        if !entry.is_fresh(now, self.ttl) {
            debug!("Cache entry for {} expired at {}", url, entry.timestamp + self.ttl);
            return None;
        }

        debug!("💾 Cache hit for {}", url);
        Some(entry)
    }

    pub async fn put(&self, url: &str, content: &str, synthetic: bool) {
        self.put_at(url, content, synthetic, Utc::now()).await;
    }

    /// Store `content` for `url` stamped with `timestamp`
    pub async fn put_at(&self, url: &str, content: &str, synthetic: bool, timestamp: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            url: url.to_string(),
            timestamp,
            synthetic,
            content: content.to_string(),
        };

        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("⚠️ Failed to serialize cache entry for {}: {}", url, e);
                return;
            }
        };

        if let Err(e) = fs::create_dir_all(&self.directory).await {
            warn!("⚠️ Failed to create cache directory {:?}: {}", self.directory, e);
            return;
        }

        let path = self.entry_path(url);
        match fs::write(&path, serialized).await {
            Ok(()) => debug!("💾 Cached {} ({} bytes, synthetic: {})", url, content.len(), synthetic),
            Err(e) => warn!("⚠️ Cache write failed for {} ({:?}): {}", url, path, e),
        }
    }

    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    /// Delete entry files that are stale at `now`, returning how many were removed
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        if !self.enabled {
            return 0;
        }

        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!("⚠️ Cannot list cache directory {:?}: {}", self.directory, e);
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let dir_entry = match entries.next_entry().await {
                Ok(Some(dir_entry)) => dir_entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("⚠️ Cache directory listing interrupted: {}", e);
                    break;
                }
            };

            let path = dir_entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let expired = match fs::read_to_string(&path).await {
                Ok(raw) => match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => !entry.is_fresh(now, self.ttl),
                    Err(e) => {
                        debug!("Skipping unreadable cache file {:?}: {}", path, e);
                        false
                    }
                },
                Err(e) => {
                    warn!("⚠️ Cache read failed for {:?}: {}", path, e);
                    false
                }
            };

            if expired {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("⚠️ Failed to remove expired cache file {:?}: {}", path, e),
                }
            }
        }

        info!("🧹 Removed {} expired cache entries from {:?}", removed, self.directory);
        removed
    }
}
