//! Infrastructure layer for fetching, caching, parsing and persistence
//!
//! Everything that touches the network, the filesystem or HTML lives here.
//! The domain layer stays free of I/O.

pub mod config; // Configuration file and defaults
pub mod logging; // Logging infrastructure
pub mod fetch_error;
pub mod parsing_error;
pub mod response_cache;
pub mod http_client;
#[cfg(feature = "browser")]
pub mod browser; // Headless Chrome transport
pub mod sample_data;
pub mod page_fetcher;
pub mod parsing;
pub mod export;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, ConfigOrigin};
pub use export::{ExportPaths, ReportExporter};
pub use fetch_error::{FetchError, FetchResult};
pub use http_client::HttpClient;
pub use logging::{get_log_directory, init_logging_with_config};
pub use page_fetcher::{FetchedPage, PageFetcher, PageOrigin, PageTransport, RetryPolicy};
pub use parsing::{ListingParser, ParsedPage, ParsingError, ParsingResult};
pub use response_cache::ResponseCache;
