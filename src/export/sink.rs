use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ExportError;

/// Destination of a client-side file save.
pub trait DownloadSink: Send + Sync {
    fn save(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<(), ExportError>;
}

/// Writes downloads into a directory, the way a browser drops them into its download folder.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn target_path(&self, filename: &str) -> Result<PathBuf, ExportError> {
        let trimmed = filename.trim();
        if trimmed.is_empty()
            || trimmed.contains('/')
            || trimmed.contains('\\')
            || trimmed == "."
            || trimmed == ".."
        {
            return Err(ExportError::InvalidFilename {
                filename: filename.to_string(),
            });
        }
        Ok(self.dir.join(trimmed))
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<(), ExportError> {
        let path = self.target_path(filename)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| ExportError::Write {
            path: self.dir.display().to_string(),
            source: e,
        })?;
        std::fs::write(&path, bytes).map_err(|e| ExportError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), mime, "saved download");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory; used by embedders that stream the bytes themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<SavedFile>>,
}

impl MemorySink {
    fn files(&self) -> MutexGuard<'_, Vec<SavedFile>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.files().clone()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<(), ExportError> {
        self.files().push(SavedFile {
            filename: filename.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
