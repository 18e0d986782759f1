//! CSV and JSON output of the collected listings.
//!
//! Both documents are rendered in memory first, written next to their final
//! paths as `*.tmp` files and then renamed into place. A CSV from an earlier
//! run is moved aside to `*.bak` first and put back if the JSON rename fails,
//! so a failed run leaves the previous pair of files as it found them.

pub mod structured;
pub mod tabular;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::models::BookListing;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub records: usize,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

pub struct Exporter {
    csv_path: PathBuf,
    json_path: PathBuf,
}

impl Exporter {
    pub fn new(csv_path: impl Into<PathBuf>, json_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            json_path: json_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.csv_path(), config.json_path())
    }

    #[instrument(level = "info", skip_all, fields(csv = %self.csv_path.display(), json = %self.json_path.display()))]
    pub async fn export(&self, records: &[BookListing]) -> Result<ExportSummary, ExportError> {
        let csv = tabular::to_csv(records)?;
        let json = structured::to_json(records)?;

        for path in [&self.csv_path, &self.json_path] {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).await.map_err(|source| {
                    error!("Failed to create output directory {}: {}", dir.display(), source);
                    ExportError::Io {
                        path: dir.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let csv_tmp = tmp_path(&self.csv_path);
        let json_tmp = tmp_path(&self.json_path);

        if let Err(e) = self.write_both(&csv, &json, &csv_tmp, &json_tmp).await {
            error!("Export failed, removing partial output: {}", e);
            for path in [&csv_tmp, &json_tmp] {
                remove_if_present(path).await;
            }
            return Err(e);
        }

        info!("Data exported to {}", self.csv_path.display());
        info!("Data exported to {}", self.json_path.display());

        Ok(ExportSummary {
            records: records.len(),
            csv_path: self.csv_path.clone(),
            json_path: self.json_path.clone(),
        })
    }

    async fn write_both(
        &self,
        csv: &[u8],
        json: &[u8],
        csv_tmp: &Path,
        json_tmp: &Path,
    ) -> Result<(), ExportError> {
        write(csv_tmp, csv).await?;
        write(json_tmp, json).await?;

        let csv_backup = sibling_path(&self.csv_path, ".bak");
        let had_previous = move_aside(&self.csv_path, &csv_backup).await?;

        let installed = match rename(csv_tmp, &self.csv_path).await {
            Ok(()) => rename(json_tmp, &self.json_path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = installed {
            remove_if_present(&self.csv_path).await;
            if had_previous {
                if let Err(restore) = fs::rename(&csv_backup, &self.csv_path).await {
                    error!(
                        "Could not restore {} from {}: {}",
                        self.csv_path.display(),
                        csv_backup.display(),
                        restore
                    );
                }
            }
            return Err(e);
        }

        remove_if_present(&csv_backup).await;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

/// Rename an existing file to `backup`. Returns whether there was one.
async fn move_aside(path: &Path, backup: &Path) -> Result<bool, ExportError> {
    match fs::rename(path, backup).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ExportError::Io {
            path: backup.to_path_buf(),
            source,
        }),
    }
}

async fn write(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).await.map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn rename(from: &Path, to: &Path) -> Result<(), ExportError> {
    fs::rename(from, to).await.map_err(|source| ExportError::Io {
        path: to.to_path_buf(),
        source,
    })
}

async fn remove_if_present(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
