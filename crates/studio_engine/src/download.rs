use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::fetch::StudioApi;
use crate::FetchError;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not save download: {0}")]
    Persist(#[from] PersistError),
}

/// `bria_ai_{millis}.png`.
pub fn download_filename(timestamp_millis: i64) -> String {
    format!("bria_ai_{timestamp_millis}.png")
}

pub fn report_filename(timestamp_millis: i64) -> String {
    format!("studio_results_{timestamp_millis}.html")
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes files into one directory via a temp file and rename, never clobbering an existing file.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        let target = self.available_path(filename);
        tmp.persist_noclobber(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// `name.ext`, then `name_1.ext`, `name_2.ext`, ... until unused.
    fn available_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }
        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (filename, String::new()),
        };
        (1u32..)
            .map(|n| self.dir.join(format!("{stem}_{n}{ext}")))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

/// Fetches `url` and saves the bytes into `dir` under a timestamped name.
pub async fn download_to_dir(
    api: &dyn StudioApi,
    url: &str,
    dir: &Path,
    timestamp_millis: i64,
    cancel: &CancellationToken,
) -> Result<PathBuf, DownloadError> {
    let bytes = api.download(url, cancel).await?;
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let filename = download_filename(timestamp_millis);
    let path = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes))
        .await
        .map_err(|err| PersistError::Io(io::Error::other(err)))??;
    Ok(path)
}
