use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::scrapers::{FetchError, FetchedPage, PageSource};

pub fn create_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(2)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

/// GET `url` and return its body, making up to `max_retries` attempts with
/// exponential backoff between them.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_retries: u32,
    backoff: Duration,
) -> Result<String, FetchError> {
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!("{}", e);
                last_error = Some(e);
            }
        }

        attempts += 1;
        if attempts < max_retries {
            let delay = backoff * 2u32.pow(attempts - 1);
            warn!("Retrying in {:?}... (attempt {}/{})", delay, attempts + 1, max_retries);
            sleep(delay).await;
        }
    }

    let last = last_error.unwrap_or_else(|| FetchError::Status {
        url: url.to_string(),
        status: reqwest::StatusCode::REQUEST_TIMEOUT,
    });
    error!("Failed to fetch {} after {} attempts", url, attempts);

    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
        last: Box::new(last),
    })
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(request_error)
}

/// Fetches catalogue pages over HTTP, pausing a fixed delay after every call.
pub struct HttpPageFetcher {
    client: Client,
    config: Arc<Config>,
}

impl HttpPageFetcher {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    async fn fetch_page(&self, url: String) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(&url).map_err(|source| FetchError::InvalidUrl {
            url: url.clone(),
            source,
        })?;

        info!("Fetching: {}", url);
        let body = fetch_with_retry(
            &self.client,
            &url,
            self.config.max_retries,
            Duration::from_millis(self.config.retry_backoff_ms),
        )
        .await?;

        Ok(FetchedPage { url: parsed, body })
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch(&self, page: u32) -> Result<FetchedPage, FetchError> {
        let result = self.fetch_page(self.config.page_url(page)).await;

        let delay = Duration::from_millis(self.config.request_delay_ms);
        debug!("Waiting {:?} before next request", delay);
        sleep(delay).await;

        result
    }
}
