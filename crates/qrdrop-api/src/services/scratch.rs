//! Request-scoped local scratch files.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use qrdrop_core::AppError;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

/// A file in a scratch directory that is removed when dropped.
///
/// Ownership is exclusive to the request that created it, so every exit path
/// (early `?` return, panic unwinding, success) removes the file.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Take ownership of `dir/name`, creating it empty. Fails if it exists.
    pub async fn create(dir: &Path, name: &str) -> Result<Self, AppError> {
        let path = dir.join(name);
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create scratch file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        match TempPath::try_from_path(&path) {
            Ok(path) => Ok(Self { path }),
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(AppError::Internal(format!(
                    "Failed to claim scratch file {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    /// Stream `body` into the file and return the number of bytes written.
    pub async fn write_stream<S>(&self, mut body: S) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Unpin,
    {
        let mut file = tokio::fs::File::create(self.path()).await?;
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    pub async fn write_all(&self, data: &[u8]) -> Result<(), AppError> {
        tokio::fs::write(self.path(), data).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now, logging a failure instead of returning it.
    pub fn close(self) {
        let path: PathBuf = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let file = ScratchFile::create(dir.path(), "a.png").await.unwrap();
            file.write_all(b"data").await.unwrap();
            assert!(file.path().exists());
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn removed_when_stream_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = ScratchFile::create(dir.path(), "b.mp4").await.unwrap();
        let path = file.path().to_path_buf();

        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(AppError::PayloadTooLarge("too big".to_string())),
        ]);
        let result = async move {
            file.write_stream(chunks).await?;
            Ok::<_, AppError>(())
        }
        .await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn write_stream_counts_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = ScratchFile::create(dir.path(), "c.gif").await.unwrap();
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cde")),
        ]);
        assert_eq!(file.write_stream(chunks).await.unwrap(), 5);
        assert_eq!(tokio::fs::read(file.path()).await.unwrap(), b"abcde");
        let path = file.path().to_path_buf();
        file.close();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn refuses_to_clobber_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("d.png"), b"x").await.unwrap();
        assert!(ScratchFile::create(dir.path(), "d.png").await.is_err());
        assert!(dir.path().join("d.png").exists());
    }
}
