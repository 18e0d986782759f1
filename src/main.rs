use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod export;
mod models;
mod parsers;
mod scrapers;
mod utils;

use crate::config::Config;
use crate::export::Exporter;
use crate::scrapers::{PaginationDriver, ScrapeReport};
use crate::utils::http::{create_client, HttpPageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("books_scraper=info".parse()?),
        )
        .init();

    info!("Starting Books Scraper");

    if let Err(e) = run().await {
        error!("Scraping failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run() -> Result<()> {
    let config = Arc::new(Config::load().context("Failed to load configuration")?);

    let client = create_client(&config)?;
    let fetcher = HttpPageFetcher::new(client, config.clone());
    let driver = PaginationDriver::new(fetcher, config.min_records, config.last_page);

    let report = driver.run().await?;
    log_report(&report);

    let summary = Exporter::from_config(&config)
        .export(&report.records)
        .await
        .context("Failed to export scraped books")?;

    info!(
        "Successfully exported {} books to {} and {}",
        summary.records,
        summary.csv_path.display(),
        summary.json_path.display()
    );

    Ok(())
}

fn log_report(report: &ScrapeReport) {
    info!(
        "Collected {} books from {} pages ({} failed, {} listings skipped, stop: {:?})",
        report.records.len(),
        report.pages_visited,
        report.failed_pages.len(),
        report.skipped_listings,
        report.stop_reason
    );

    for (i, book) in report.records.iter().take(3).enumerate() {
        info!(
            "Sample {}: {} | {} | {} stars | {} | {}",
            i + 1,
            book.title,
            book.price,
            book.rating.stars(),
            book.availability,
            book.product_url
        );
    }
}
