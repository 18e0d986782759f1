use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding an alternative config file path.
const CONFIG_PATH_ENV: &str = "BOOKS_SCRAPER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "books_scraper.toml";
const ENV_PREFIX: &str = "BOOKS_SCRAPER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub page_url_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub request_delay_ms: u64,
    pub min_records: usize,
    pub last_page: u32,
    pub output_dir: PathBuf,
    pub csv_filename: String,
    pub json_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url_template: "https://books.toscrape.com/catalogue/page-{page}.html".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_backoff_ms: 1000,
            request_delay_ms: 1000,
            min_records: 500,
            last_page: 50,
            output_dir: PathBuf::from("."),
            csv_filename: "books_data.csv".to_string(),
            json_filename: "books_data.json".to_string(),
        }
    }
}

impl Config {
    /// Layered load: built-in defaults, then `books_scraper.toml` (or the file
    /// named by `BOOKS_SCRAPER_CONFIG`) if present, then `BOOKS_SCRAPER_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.page_url_template.contains("{page}") {
            return Err(ConfigError::Invalid(format!(
                "page_url_template must contain {{page}}: {}",
                self.page_url_template
            )));
        }
        if let Err(e) = url::Url::parse(&self.page_url(1)) {
            return Err(ConfigError::Invalid(format!(
                "page_url_template does not produce a URL ({}): {}",
                e, self.page_url_template
            )));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".to_string()));
        }
        if self.last_page == 0 {
            return Err(ConfigError::Invalid("last_page must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn page_url(&self, page: u32) -> String {
        self.page_url_template.replace("{page}", &page.to_string())
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_filename)
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(&self.json_filename)
    }
}
