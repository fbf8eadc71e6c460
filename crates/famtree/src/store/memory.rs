//! In-memory collaborators

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{AuthProvider, BlobRef, BlobStore, DocumentStore, User};
use crate::error::StoreError;

/// Document store held in a concurrent map.
///
/// `set_offline(true)` makes every call fail with `Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<(String, String), Value>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without going through the async interface.
    pub fn insert(&self, collection: &str, id: &str, record: Value) {
        self.documents
            .insert((collection.to_string(), id.to_string()), record);
    }

    /// Copy of a stored record.
    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.documents
            .get(&(collection.to_string(), id.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Simulate the backend going away or coming back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("document store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        Ok(self.get(collection, id))
    }

    async fn save(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        self.check_online()?;
        self.insert(collection, id, record.clone());
        Ok(())
    }
}

/// Blob store held in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Vec<u8>>,
    offline: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Simulate the backend going away or coming back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<BlobRef, StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("blob store offline".to_string()));
        }
        self.blobs.insert(key.to_string(), bytes);
        Ok(BlobRef(key.to_string()))
    }

    async fn resolve(&self, reference: &BlobRef) -> Result<String, StoreError> {
        if !self.blobs.contains_key(reference.as_str()) {
            return Err(StoreError::UnknownBlob(reference.0.clone()));
        }
        Ok(format!("memory://{}", reference.as_str()))
    }
}

/// Auth provider whose identity is set by hand.
#[derive(Debug, Default)]
pub struct StaticAuth {
    user: RwLock<Option<User>>,
}

impl StaticAuth {
    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Signed in as `uid`.
    pub fn signed_in(uid: impl Into<String>) -> Self {
        let auth = Self::default();
        auth.sign_in(User {
            uid: uid.into(),
            email: None,
        });
        auth
    }

    /// Switch the current user.
    pub fn sign_in(&self, user: User) {
        if let Ok(mut slot) = self.user.write() {
            *slot = Some(user);
        }
    }

    /// Clear the current user.
    pub fn sign_out(&self) {
        if let Ok(mut slot) = self.user.write() {
            *slot = None;
        }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|user| user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = MemoryDocumentStore::new();
        assert_eq!(store.load("families", "1").await.unwrap(), None);

        store.save("families", "1", &json!({ "id": "1" })).await.unwrap();
        assert_eq!(
            store.load("families", "1").await.unwrap(),
            Some(json!({ "id": "1" }))
        );
    }

    #[tokio::test]
    async fn test_offline_documents() {
        let store = MemoryDocumentStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.save("families", "1", &json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_blob_put_overwrites() {
        let store = MemoryBlobStore::new();
        store.put("images/1.jpg", vec![1]).await.unwrap();
        let reference = store.put("images/1.jpg", vec![2]).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("images/1.jpg"), Some(vec![2]));
        assert_eq!(
            store.resolve(&reference).await.unwrap(),
            "memory://images/1.jpg"
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_blob() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.resolve(&BlobRef::from("images/9.jpg")).await,
            Err(StoreError::UnknownBlob(_))
        ));
    }

    #[test]
    fn test_static_auth() {
        let auth = StaticAuth::signed_out();
        assert_eq!(auth.current_user(), None);
        auth.sign_in(User {
            uid: "u1".to_string(),
            email: None,
        });
        assert_eq!(auth.current_user().map(|u| u.uid), Some("u1".to_string()));
        auth.sign_out();
        assert_eq!(auth.current_user(), None);
    }
}
