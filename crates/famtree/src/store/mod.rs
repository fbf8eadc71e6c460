//! Collaborator interfaces consumed by the editor
//!
//! The editor never talks to a backend directly. It persists whole
//! documents through a [`DocumentStore`], uploads photos through a
//! [`BlobStore`] and asks an [`AuthProvider`] whether anyone is signed in.

mod fs;
mod memory;

pub use fs::{FsBlobStore, FsDocumentStore};
pub use memory::{MemoryBlobStore, MemoryDocumentStore, StaticAuth};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Opaque reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRef(pub String);

impl BlobRef {
    /// The reference as stored in a person's `image` field.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlobRef {
    fn from(s: &str) -> Self {
        BlobRef(s.to_string())
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable user identifier
    pub uid: String,
    /// Email, when the provider knows one
    pub email: Option<String>,
}

/// Whole-document storage keyed by collection and id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a raw record, or `None` if it does not exist.
    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Write a record, replacing whatever was stored under the same id.
    async fn save(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;
}

/// Binary object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any previous blob there.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<BlobRef, StoreError>;

    /// Turn a reference into a retrievable URL.
    async fn resolve(&self, reference: &BlobRef) -> Result<String, StoreError>;
}

/// Source of the current signed-in identity; may change at any time.
pub trait AuthProvider: Send + Sync {
    /// The current user, if any.
    fn current_user(&self) -> Option<User>;
}
