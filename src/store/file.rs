use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::SessionStore;

/// File-backed session store: one `sess_<id>` file per session.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create session directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the file for an id, rejecting anything that could escape the
    /// root directory. Ids come from the network.
    fn record_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty()
            || !id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            bail!("Invalid session id: {id:?}");
        }
        Ok(self.root.join(format!("sess_{id}")))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(id)?;

        match async_fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read session file: {}", path.display())),
        }
    }

    async fn write(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.record_path(id)?;

        let mut file = async_fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create session file: {}", path.display()))?;
        file.write_all(bytes)
            .await
            .context("Failed to write session data")?;
        file.sync_all()
            .await
            .context("Failed to sync session file")?;

        debug!("Wrote {} bytes for session {}", bytes.len(), id);
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        let path = self.record_path(id)?;

        match async_fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Destroyed session file for {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session file: {}", path.display()))
            }
        }
    }
}
