//! Report writers
//!
//! Raw JSON (product array and full report) goes under the raw directory.
//! Flat CSV tables for products, brands, types and packaging go under the
//! processed directory next to a workbook holding the same four tables as
//! sheets. Every processed file also gets a `_latest` copy.

#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::domain::product::Product;
use crate::domain::report::CollectionReport;
use crate::infrastructure::config::OutputConfig;

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    name: &'a str,
    price: f64,
    rating: f64,
    reviews_count: u32,
    source: &'a str,
    brand: &'a str,
    #[serde(rename = "type")]
    coffee_type: &'static str,
    packaging_value: f64,
    packaging_unit: &'a str,
    packaging_display: &'a str,
    price_tier: &'static str,
}

impl<'a> From<&'a Product> for ProductRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            name: &product.name,
            price: product.price,
            rating: product.rating,
            reviews_count: product.reviews_count,
            source: &product.source,
            brand: &product.brand,
            coffee_type: product.coffee_type.as_str(),
            packaging_value: product.packaging.value,
            packaging_unit: &product.packaging.unit,
            packaging_display: &product.packaging.display,
            price_tier: product.price_tier.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BrandRow<'a> {
    brand: &'a str,
    product_count: u32,
    avg_price: f64,
    coffee_types: String,
}

#[derive(Debug, Serialize)]
struct TypeRow {
    coffee_type: &'static str,
    product_count: u32,
    avg_price: f64,
    brands: String,
}

#[derive(Debug, Serialize)]
struct PackagingRow<'a> {
    packaging_size: &'a str,
    product_count: u32,
    avg_price: f64,
}

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub products_json: PathBuf,
    pub report_json: PathBuf,
    pub products_csv: PathBuf,
    pub brands_csv: PathBuf,
    pub types_csv: PathBuf,
    pub packaging_csv: PathBuf,
    pub workbook: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportExporter {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.raw_dir, &config.processed_dir)
    }

    /// Write every output file, stamped with the report's collection time
    pub async fn export(&self, report: &CollectionReport) -> Result<ExportPaths> {
        fs::create_dir_all(&self.raw_dir)
            .await
            .with_context(|| format!("Failed to create {:?}", self.raw_dir))?;
        fs::create_dir_all(&self.processed_dir)
            .await
            .with_context(|| format!("Failed to create {:?}", self.processed_dir))?;

        let stamp = report.metadata.collection_time.format("%Y%m%d_%H%M%S").to_string();

        let products_json = self.raw_dir.join(format!("coffee_market_{}.json", stamp));
        write_json(&products_json, &report.products).await?;

        let report_json = self.raw_dir.join(format!("coffee_market_processed_{}.json", stamp));
        write_json(&report_json, report).await?;

        let aggregates = &report.aggregates;

        let products = csv_table(report.products.iter().map(ProductRow::from))?;

        let brands = csv_table(aggregates.brands.iter().map(|(brand, stats)| BrandRow {
            brand,
            product_count: stats.summary.count,
            avg_price: round2(stats.summary.avg_price),
            coffee_types: stats
                .types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }))?;

        let types = csv_table(aggregates.types.iter().map(|(coffee_type, stats)| TypeRow {
            coffee_type: coffee_type.as_str(),
            product_count: stats.summary.count,
            avg_price: round2(stats.summary.avg_price),
            brands: stats.brands.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
        }))?;

        let packaging = csv_table(aggregates.packaging.iter().map(|(size, stats)| PackagingRow {
            packaging_size: size,
            product_count: stats.count,
            avg_price: round2(stats.avg_price),
        }))?;

        let workbook = build_workbook(&[
            ("products", products.as_slice()),
            ("brands", brands.as_slice()),
            ("types", types.as_slice()),
            ("packaging", packaging.as_slice()),
        ])?;

        let paths = ExportPaths {
            products_json,
            report_json,
            products_csv: self.write_processed("coffee_products", &stamp, "csv", &products).await?,
            brands_csv: self.write_processed("coffee_brands", &stamp, "csv", &brands).await?,
            types_csv: self.write_processed("coffee_types", &stamp, "csv", &types).await?,
            packaging_csv: self.write_processed("coffee_packaging", &stamp, "csv", &packaging).await?,
            workbook: self
                .write_processed("coffee_market_all_categories", &stamp, "xlsx", &workbook)
                .await?,
        };

        info!(
            "💾 Exported {} products to {:?} and {:?}",
            report.products.len(),
            self.raw_dir,
            self.processed_dir
        );

        Ok(paths)
    }

    /// Write `<name>_<stamp>.<ext>` and `<name>_latest.<ext>`
    async fn write_processed(&self, name: &str, stamp: &str, ext: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.processed_dir.join(format!("{}_{}.{}", name, stamp, ext));
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;

        let latest = self.processed_dir.join(format!("{}_latest.{}", name, ext));
        fs::write(&latest, content)
            .await
            .with_context(|| format!("Failed to write {:?}", latest))?;

        Ok(path)
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Serialize rows into an in-memory CSV table with a header row
fn csv_table<R: Serialize>(rows: impl Iterator<Item = R>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV table: {}", e.error()))
}

/// One sheet per CSV table; numeric cells are written as numbers
fn build_workbook(sheets: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(*name)
            .with_context(|| format!("Invalid sheet name {}", name))?;

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(*table);
        for (row, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Unreadable {} table", name))?;
            for (col, cell) in record.iter().enumerate() {
                let (row, col) = (row as u32, col as u16);
                let written = match cell.parse::<f64>() {
                    Ok(number) if number.is_finite() => worksheet.write_number(row, col, number),
                    _ => worksheet.write_string(row, col, cell),
                };
                written.with_context(|| format!("Failed to write {} sheet", name))?;
            }
        }
    }

    workbook.save_to_buffer().context("Failed to build workbook")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::MarketAggregates;
    use crate::domain::classification::PriceTierThresholds;
    use crate::domain::report::{DataQuality, DataSource, RunMetadata};
    use crate::infrastructure::sample_data::sample_products;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report() -> CollectionReport {
        let products = sample_products(&PriceTierThresholds::default());
        let mut aggregates = MarketAggregates::new();
        for product in &products {
            aggregates.fold(product);
        }

        CollectionReport {
            metadata: RunMetadata {
                collection_time: Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
                successful_sites: vec![],
                failed_sites: vec!["daraz".to_string()],
                total_products: products.len(),
                total_brands: aggregates.brands.len(),
                data_quality: DataQuality::Sample,
                data_source: DataSource::SampleGeneration,
                sample_fallback_sites: vec![],
                site_reports: vec![],
                note: None,
            },
            products,
            aggregates,
        }
    }

    #[tokio::test]
    async fn writes_timestamped_and_latest_files() {
        let dir = TempDir::new().unwrap();
        let exporter = ReportExporter::new(dir.path().join("raw"), dir.path().join("processed"));

        let paths = exporter.export(&report()).await.unwrap();

        assert!(paths.products_json.ends_with("coffee_market_20261017_093000.json"));
        assert!(paths.report_json.exists());
        assert!(dir.path().join("processed/coffee_products_latest.csv").exists());
        assert!(dir.path().join("processed/coffee_packaging_latest.csv").exists());
        assert!(paths.workbook.ends_with("coffee_market_all_categories_20261017_093000.xlsx"));
        assert!(dir.path().join("processed/coffee_market_all_categories_latest.xlsx").exists());

        let products: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&paths.products_json).unwrap()).unwrap();
        assert_eq!(products.len(), 10);
        assert_eq!(products[0]["source"], "sample_data");
    }

    #[tokio::test]
    async fn csv_tables_flatten_nested_fields() {
        let dir = TempDir::new().unwrap();
        let exporter = ReportExporter::new(dir.path().join("raw"), dir.path().join("processed"));
        let paths = exporter.export(&report()).await.unwrap();

        let mut products = csv::Reader::from_path(&paths.products_csv).unwrap();
        let headers = products.headers().unwrap().clone();
        assert!(headers.iter().any(|h| h == "packaging_display"));
        assert!(headers.iter().any(|h| h == "type"));
        assert_eq!(products.records().count(), 10);

        let mut brands = csv::Reader::from_path(&paths.brands_csv).unwrap();
        let rows: Vec<csv::StringRecord> = brands.records().map(Result::unwrap).collect();
        let nescafe = rows.iter().find(|row| &row[0] == "Nescafe").unwrap();
        assert_eq!(&nescafe[1], "3");
        assert_eq!(&nescafe[3], "instant, mix, other");
    }

    #[tokio::test]
    async fn workbook_holds_one_sheet_per_table() {
        let dir = TempDir::new().unwrap();
        let exporter = ReportExporter::new(dir.path().join("raw"), dir.path().join("processed"));
        let paths = exporter.export(&report()).await.unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&paths.workbook).unwrap();
        assert_eq!(workbook.sheet_names(), ["products", "brands", "types", "packaging"]);

        let products = workbook.worksheet_range("products").unwrap();
        assert_eq!(products.height(), 11);
        assert_eq!(products.get_value((0, 0)), Some(&Data::String("name".to_string())));
        assert_eq!(products.get_value((1, 1)), Some(&Data::Float(950.0)));
    }
}
