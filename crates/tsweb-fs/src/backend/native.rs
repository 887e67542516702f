//! Host filesystem storage on the tokio runtime.

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{Backend, DirEntry, EntryKind};
use crate::error::BackendError;

/// Storage backed by `tokio::fs`.
///
/// Paths are used as given; the cache hands over normalized absolute paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackend;

impl TokioBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for TokioBackend {
    fn read_file(&self, path: &str) -> BoxFuture<'static, Result<Vec<u8>, BackendError>> {
        let path = path.to_string();
        async move {
            tokio::fs::read(&path)
                .await
                .map_err(|e| BackendError::io(path, e))
        }
        .boxed()
    }

    fn write_file(&self, path: &str, data: Vec<u8>) -> BoxFuture<'static, Result<(), BackendError>> {
        let path = path.to_string();
        async move {
            tokio::fs::write(&path, data)
                .await
                .map_err(|e| BackendError::io(path, e))
        }
        .boxed()
    }

    fn read_directory(
        &self,
        path: &str,
    ) -> BoxFuture<'static, Result<Vec<DirEntry>, BackendError>> {
        let path = path.to_string();
        async move {
            let mut read_dir = tokio::fs::read_dir(&path)
                .await
                .map_err(|e| BackendError::io(path.as_str(), e))?;

            let mut entries = Vec::new();
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| BackendError::io(path.as_str(), e))?
            {
                let kind = match entry.file_type().await {
                    Ok(t) if t.is_file() => EntryKind::File,
                    Ok(t) if t.is_dir() => EntryKind::Directory,
                    _ => EntryKind::Other,
                };
                entries.push(DirEntry::new(
                    entry.file_name().to_string_lossy().into_owned(),
                    kind,
                ));
            }
            Ok(entries)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_writes_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let backend = TokioBackend::new();

        tokio::fs::create_dir(dir.path().join("src")).await.unwrap();
        backend
            .write_file(&format!("{root}/a.ts"), b"let a = 1;".to_vec())
            .await
            .unwrap();

        let content = backend.read_file(&format!("{root}/a.ts")).await.unwrap();
        assert_eq!(content, b"let a = 1;");

        let mut listing = backend.read_directory(&root).await.unwrap();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            listing,
            vec![DirEntry::file("a.ts"), DirEntry::directory("src")]
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ts");
        let err = TokioBackend::new()
            .read_file(&path.to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
