use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::error::SliceError;

/// Receiver of a finished archive.
///
/// Implementations decide what "download" means: writing to disk, streaming
/// to a client, keeping the bytes in memory.
#[async_trait]
pub trait DownloadTarget: Send + Sync {
    /// Deliver a complete archive under the given file name.
    async fn deliver(&self, file_name: &str, data: Bytes) -> Result<(), SliceError>;
}

/// Writes archives into a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl FileDownload {
    /// Create a target that writes into `dir`, creating it on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path an archive with this name is written to.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

#[async_trait]
impl DownloadTarget for FileDownload {
    async fn deliver(&self, file_name: &str, data: Bytes) -> Result<(), SliceError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(file_name);
        tokio::fs::write(&path, &data).await?;

        info!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}
