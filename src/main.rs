//! Coffee Market Collector command line
//!
//! - `collect`: scrape the configured sites and write JSON, CSV and workbook reports
//! - `init-config`: write the default configuration file
//! - `purge-cache`: delete expired cache entries

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use coffee_market_collector::{
    domain::report::CollectionReport,
    infrastructure::{
        config::ConfigOrigin,
        export::ExportPaths,
        logging::{init_logging_with_config, log_system_info},
    },
    AppConfig, CoffeeMarketCollector, CollectOptions, ConfigManager, PageFetcher, ReportExporter,
    ResponseCache, SampleFallback,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "coffee-market")]
#[command(about = "Collect coffee product listings from Pakistani online shops")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured site and export the results
    Collect {
        /// Only visit the first N sites
        #[arg(long)]
        max_sites: Option<usize>,

        /// Pages per site
        #[arg(short, long)]
        pages: Option<u32>,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,

        /// Use the labeled sample dataset when every site fails
        #[arg(long)]
        sample_fallback: bool,

        /// Base directory for `raw/` and `processed/` output
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Delete expired cache entries
    PurgeCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };

    match cli.command {
        Commands::Collect {
            max_sites,
            pages,
            no_cache,
            sample_fallback,
            output_dir,
        } => {
            let (mut config, origin) = manager.load_or_create().await?;
            init_logging_with_config(&config.logging)?;
            log_system_info();
            log_config_origin(&manager, origin);

            if let Some(pages) = pages {
                config.collector.page_budget = pages;
            }
            if no_cache {
                config.cache.enabled = false;
            }
            if let Some(dir) = output_dir {
                config.output.raw_dir = dir.join("raw");
                config.output.processed_dir = dir.join("processed");
            }

            let mut options = CollectOptions::from_config(&config.collector);
            if max_sites.is_some() {
                options.max_sites = max_sites;
            }
            if sample_fallback {
                options.sample_fallback = SampleFallback::WhenAllSitesFail;
            }

            let (report, paths) = collect(&config, &options).await?;
            print_summary(&report, &paths);
        }
        Commands::InitConfig { force } => {
            let config = if force || !manager.config_path().exists() {
                manager.reset_to_defaults().await?
            } else {
                manager.load_config().await?
            };
            println!("Configuration: {}", manager.config_path().display());
            println!("Sites: {}", config.sites.len());
        }
        Commands::PurgeCache => {
            let (config, origin) = manager.load_or_create().await?;
            init_logging_with_config(&config.logging)?;
            log_config_origin(&manager, origin);

            let cache = ResponseCache::from_config(&config.cache);
            if !cache.is_enabled() {
                println!("Cache is disabled in {}", manager.config_path().display());
                return Ok(());
            }
            let removed = cache.purge_expired().await;
            println!("Removed {} expired cache entries from {}", removed, cache.directory().display());
        }
    }

    Ok(())
}

fn log_config_origin(manager: &ConfigManager, origin: ConfigOrigin) {
    match origin {
        ConfigOrigin::Created => info!("Created default configuration: {:?}", manager.config_path()),
        ConfigOrigin::Loaded => info!("Loaded configuration from: {:?}", manager.config_path()),
    }
}

async fn collect(config: &AppConfig, options: &CollectOptions) -> Result<(CollectionReport, ExportPaths)> {
    let cache = ResponseCache::from_config(&config.cache);
    let fetcher = Arc::new(PageFetcher::from_config(config, cache)?);
    let collector = CoffeeMarketCollector::from_config(config, fetcher);

    let report = collector.collect(options).await;
    let paths = ReportExporter::from_config(&config.output).export(&report).await?;

    info!("✅ Collection finished");
    Ok((report, paths))
}

fn print_summary(report: &CollectionReport, paths: &ExportPaths) {
    let metadata = &report.metadata;

    println!();
    println!("Coffee market collection");
    println!("  Products:          {}", metadata.total_products);
    println!("  Brands:            {}", metadata.total_brands);
    println!("  Data quality:      {:?}", metadata.data_quality);
    println!("  Successful sites:  {}", metadata.successful_sites.join(", "));
    println!("  Failed sites:      {}", metadata.failed_sites.join(", "));
    if !metadata.sample_fallback_sites.is_empty() {
        println!("  Sample fallback:   {}", metadata.sample_fallback_sites.join(", "));
    }
    if let Some(note) = &metadata.note {
        println!("  Note:              {}", note);
    }

    println!();
    println!("Price tiers:");
    for (tier, products) in &report.aggregates.price_tiers {
        println!("  {:<8} {}", tier.as_str(), products.len());
    }

    println!();
    println!("Output:");
    for path in [
        &paths.products_json,
        &paths.report_json,
        &paths.products_csv,
        &paths.brands_csv,
        &paths.types_csv,
        &paths.packaging_csv,
        &paths.workbook,
    ] {
        println!("  {}", path.display());
    }
}
