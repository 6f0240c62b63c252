/// Blob storage for uploaded assets
///
/// `put` stores a file under a logical folder and returns its relative path,
/// `delete` removes a previously returned path. Paths are what the database
/// records in `projects.cover_image`.

use crate::project::types::UploadedFile;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// Abstract file storage for cover images
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Store `file` under `folder`, returning the new relative path
    async fn put(&self, folder: &str, file: &UploadedFile) -> Result<String>;

    /// Remove a stored file; `Ok(false)` when nothing was there
    async fn delete(&self, path: &str) -> Result<bool>;
}

/// Generated file name: random stem plus the upload's extension
fn blob_name(file: &UploadedFile) -> String {
    let stem = uuid::Uuid::new_v4().simple().to_string();
    match file.extension() {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Reject absolute paths and parent traversal
fn checked_relative(path: &str) -> Result<&Path> {
    let relative = Path::new(path);
    let safe = !path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(anyhow::anyhow!("Refusing blob path outside the store: '{}'", path));
    }
    Ok(relative)
}

/// Blob store backed by a directory on the local disk (the "public disk")
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored path
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        Ok(self.root.join(checked_relative(path)?))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, folder: &str, file: &UploadedFile) -> Result<String> {
        let folder_dir = self.root.join(checked_relative(folder)?);
        tokio::fs::create_dir_all(&folder_dir).await.map_err(|e| {
            anyhow::anyhow!("Failed to create blob folder '{}': {}", folder_dir.display(), e)
        })?;

        let name = blob_name(file);
        let target = folder_dir.join(&name);
        tokio::fs::write(&target, &file.bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write blob '{}': {}", target.display(), e))?;

        let path = format!("{}/{}", folder.trim_end_matches('/'), name);
        tracing::debug!("🖼️ Stored blob {} ({} bytes)", path, file.bytes.len());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::debug!("🗑️ Deleted blob {}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("⚠️ Blob already gone: {}", path);
                Ok(false)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to delete blob '{}': {}", target.display(), e)),
        }
    }
}

/// In-process blob store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Contents of a stored path
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a consistent map.
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, folder: &str, file: &UploadedFile) -> Result<String> {
        checked_relative(folder)?;
        let path = format!("{}/{}", folder.trim_end_matches('/'), blob_name(file));
        self.lock().insert(path.clone(), file.bytes.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        checked_relative(path)?;
        Ok(self.lock().remove(path).is_some())
    }
}
