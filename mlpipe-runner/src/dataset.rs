//! Dataset sources

use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::{OrchestratorError, Result};

const DEFAULT_FILE_NAME: &str = "dataset.csv";

/// Data to upload to the worker
///
/// Read-only for the whole session.
#[derive(Debug, Clone)]
pub enum Dataset {
    /// A file on disk, read when the upload happens
    File(PathBuf),
    /// An in-memory buffer with the file name to report
    Memory { name: String, bytes: Bytes },
}

impl Dataset {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Dataset::File(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Dataset::Memory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File name reported to the worker
    pub fn file_name(&self) -> &str {
        match self {
            Dataset::File(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(DEFAULT_FILE_NAME),
            Dataset::Memory { name, .. } => name,
        }
    }

    /// Checks the dataset is present without reading it
    pub fn validate(&self) -> Result<()> {
        match self {
            Dataset::File(path) if !path.is_file() => Err(OrchestratorError::DatasetMissing(
                format!("{} is not a readable file", path.display()),
            )),
            _ => Ok(()),
        }
    }

    /// Loads the full payload
    pub async fn read(&self) -> Result<Bytes> {
        match self {
            Dataset::File(path) => read_file(path).await,
            Dataset::Memory { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

async fn read_file(path: &Path) -> Result<Bytes> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| OrchestratorError::DatasetUnreadable {
            path: path.to_path_buf(),
            source,
        })
}
