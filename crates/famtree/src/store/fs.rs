//! Directory-backed collaborators used by the command-line front end

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{BlobRef, BlobStore, DocumentStore};
use crate::error::StoreError;

/// Stores each document as `<root>/<collection>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Store documents under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        let relative = PathBuf::from(collection).join(format!("{}.json", id));
        Ok(self.root.join(checked_relative(&relative)?))
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let path = self.document_path(collection, id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.document_path(collection, id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        // Write then rename so a reader never sees a half-written document.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &path).await?;
        Ok(())
    }
}

/// Stores each blob as `<root>/<key>` and resolves to a `file://` URL.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Store blobs under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(checked_relative(Path::new(key))?))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<BlobRef, StoreError> {
        let path = self.blob_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(BlobRef(key.to_string()))
    }

    async fn resolve(&self, reference: &BlobRef) -> Result<String, StoreError> {
        let path = self.blob_path(reference.as_str())?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::UnknownBlob(reference.0.clone()));
        }
        let absolute = fs::canonicalize(&path).await?;
        Ok(format!("file://{}", absolute.display()))
    }
}

/// Reject keys that would escape the store root.
fn checked_relative(path: &Path) -> Result<&Path, StoreError> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes || path.as_os_str().is_empty() {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing key outside the store: {}", path.display()),
        )));
    }
    Ok(path)
}
