use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub mod books;
pub mod driver;

pub use books::{extract_listing, scrape_catalog_page, CatalogPage};
pub use driver::{PaginationDriver, ScrapeError, ScrapeReport, StopReason};

/// A catalogue page as returned by a [`PageSource`].
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Transient, retryable fetch failure. The driver treats a page that ends in
/// one of these as having no listings.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid page URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to fetch {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

/// Failure to build one listing. Never affects the other listings on a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("listing has no {0}")]
    MissingField(&'static str),

    #[error("unrecognised star rating label {0:?}")]
    UnknownRating(String),

    #[error("invalid price {0:?}")]
    InvalidPrice(String),

    #[error("invalid {field} reference {reference:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        reference: String,
        source: url::ParseError,
    },
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch catalogue page `page` (1-based).
    async fn fetch(&self, page: u32) -> Result<FetchedPage, FetchError>;
}

#[cfg(test)]
pub(crate) mod fixtures;
