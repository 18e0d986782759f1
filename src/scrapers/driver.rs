use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::BookListing;
use crate::scrapers::{scrape_catalog_page, PageSource};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no listings collected after {pages_visited} pages ({failed_pages} failed to fetch)")]
    NoRecords {
        pages_visited: u32,
        failed_pages: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The minimum record target was met after merging a page.
    TargetReached,
    /// The configured last page was processed.
    LastPage,
    /// The page had no "next" link.
    NoNextPage,
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub records: Vec<BookListing>,
    pub pages_visited: u32,
    pub failed_pages: Vec<u32>,
    pub skipped_listings: usize,
    pub stop_reason: StopReason,
}

/// Walks catalogue pages from 1 until the record target is met or the pages
/// run out.
pub struct PaginationDriver<S> {
    source: S,
    min_records: usize,
    last_page: u32,
}

impl<S: PageSource> PaginationDriver<S> {
    pub fn new(source: S, min_records: usize, last_page: u32) -> Self {
        Self {
            source,
            min_records,
            last_page,
        }
    }

    pub async fn run(&self) -> Result<ScrapeReport, ScrapeError> {
        info!("Starting scrape - target: {} books", self.min_records);

        let mut records: Vec<BookListing> = Vec::new();
        let mut failed_pages = Vec::new();
        let mut skipped_listings = 0;
        let mut page = 1;

        let stop_reason = loop {
            // A page we could not fetch says nothing about whether more exist.
            let mut has_next = true;

            match self.source.fetch(page).await {
                Ok(fetched) => {
                    let catalog = scrape_catalog_page(&fetched.body, &fetched.url);
                    let found = catalog.listings.len();

                    for outcome in catalog.listings {
                        match outcome {
                            Ok(listing) => records.push(listing),
                            Err(e) => {
                                warn!("Skipping listing on page {}: {}", page, e);
                                skipped_listings += 1;
                            }
                        }
                    }

                    if found == 0 {
                        warn!("No listings found on page {}", page);
                    }
                    has_next = catalog.has_next;
                }
                Err(e) => {
                    error!("Page {} yielded no listings: {}", page, e);
                    failed_pages.push(page);
                }
            }

            info!("Finished page {} - total books: {}", page, records.len());

            if records.len() >= self.min_records {
                info!("Target reached! Scraped {} books", records.len());
                break StopReason::TargetReached;
            }
            if page >= self.last_page {
                break StopReason::LastPage;
            }
            if !has_next {
                info!("No more pages to scrape");
                break StopReason::NoNextPage;
            }
            page += 1;
        };

        if records.is_empty() {
            return Err(ScrapeError::NoRecords {
                pages_visited: page,
                failed_pages: failed_pages.len(),
            });
        }

        if records.len() < self.min_records {
            warn!(
                "Ran out of pages with {} of {} target books",
                records.len(),
                self.min_records
            );
        }
        if !failed_pages.is_empty() {
            warn!("Pages that could not be fetched: {:?}", failed_pages);
        }

        info!(
            "Scraping complete! Total books: {} ({} listings skipped)",
            records.len(),
            skipped_listings
        );

        Ok(ScrapeReport {
            records,
            pages_visited: page,
            failed_pages,
            skipped_listings,
            stop_reason,
        })
    }
}
