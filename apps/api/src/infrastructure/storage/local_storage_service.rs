use super::traits::StorageService;
use anyhow::{Context, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{
    fs,
    io::{AsyncWrite, AsyncWriteExt},
};

/// Stores uploads as flat files inside one directory.
///
/// The directory is append-only from the application's point of view: files
/// are opened with `create_new`, so a key collision fails instead of replacing
/// an earlier upload.
pub struct LocalStorageService {
    root: PathBuf,
    public_prefix: String,
}

impl LocalStorageService {
    /// Create the service, creating `root` (and parents) if it does not exist.
    pub async fn new(
        root: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;

        Ok(Self {
            root,
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
            || key.contains("..")
        {
            bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.root.join(key))
    }
}

/// Write `data` to a freshly created file, removing the file again if the
/// write does not complete so no truncated upload is left to be served.
async fn write_or_remove<W>(path: &Path, mut writer: W, data: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(path).await {
            tracing::warn!("Failed to remove partial upload {}: {}", path.display(), cleanup);
        }
        return Err(err).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let path = self.resolve(key)?;
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;

        write_or_remove(&path, file, &data).await?;

        tracing::debug!(key, content_type, bytes = data.len(), "Stored upload");
        Ok(self.get_url(key))
    }

    async fn read(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.resolve(key)?;
        fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    fn get_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }
}
