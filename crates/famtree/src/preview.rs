//! Local photo previews shown before an upload completes

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::person::Person;

/// Provider of transient, local-only preview handles for chosen files.
///
/// Every handle returned by [`PreviewHost::create`] must eventually be
/// passed to [`PreviewHost::revoke`]; [`LocalPreview`] does that on drop.
pub trait PreviewHost: Send + Sync {
    /// Make the bytes viewable locally and return a handle URL.
    fn create(&self, bytes: &[u8]) -> String;

    /// Release a handle previously returned by `create`.
    fn revoke(&self, handle: &str);
}

/// In-process preview host that tracks live handles.
#[derive(Debug, Default)]
pub struct MemoryPreviewHost {
    next: AtomicU64,
    live: DashMap<String, usize>,
}

impl MemoryPreviewHost {
    /// Create a host with no live previews.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether a handle is still live.
    pub fn is_live(&self, handle: &str) -> bool {
        self.live.contains_key(handle)
    }
}

impl PreviewHost for MemoryPreviewHost {
    fn create(&self, bytes: &[u8]) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let handle = format!("blob:preview/{}", n);
        self.live.insert(handle.clone(), bytes.len());
        handle
    }

    fn revoke(&self, handle: &str) {
        self.live.remove(handle);
    }
}

/// A live preview handle, revoked when dropped.
pub struct LocalPreview {
    url: String,
    host: Arc<dyn PreviewHost>,
}

impl LocalPreview {
    /// Create a preview for `bytes` on `host`.
    pub fn new(host: Arc<dyn PreviewHost>, bytes: &[u8]) -> Self {
        let url = host.create(bytes);
        Self { url, host }
    }

    /// Local URL of the preview.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for LocalPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPreview").field("url", &self.url).finish()
    }
}

impl Drop for LocalPreview {
    fn drop(&mut self) {
        self.host.revoke(&self.url);
    }
}

/// At most one live preview per person, for one editing session.
///
/// Replacing or removing an entry drops the old [`LocalPreview`], which
/// revokes it. Dropping the cache revokes everything still held.
pub struct PreviewCache {
    host: Arc<dyn PreviewHost>,
    live: HashMap<String, LocalPreview>,
}

impl PreviewCache {
    /// Create an empty cache backed by `host`.
    pub fn new(host: Arc<dyn PreviewHost>) -> Self {
        Self {
            host,
            live: HashMap::new(),
        }
    }

    /// Show a new preview for `person_id`, superseding any previous one.
    pub fn show(&mut self, person_id: &str, bytes: &[u8]) -> &LocalPreview {
        let preview = LocalPreview::new(Arc::clone(&self.host), bytes);
        debug!(person = %person_id, url = %preview.url(), "showing local preview");
        self.live.insert(person_id.to_string(), preview);
        &self.live[person_id]
    }

    /// The live preview for `person_id`, if any.
    pub fn get(&self, person_id: &str) -> Option<&LocalPreview> {
        self.live.get(person_id)
    }

    /// Release the preview for `person_id`. Returns whether one was live.
    pub fn release(&mut self, person_id: &str) -> bool {
        self.live.remove(person_id).is_some()
    }

    /// Release every preview held for a person in `subtree`.
    pub fn release_subtree(&mut self, subtree: &Person) -> usize {
        subtree
            .ids()
            .into_iter()
            .filter(|id| self.release(id))
            .count()
    }

    /// Number of previews currently held.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl fmt::Debug for PreviewCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewCache")
            .field("live", &self.live)
            .finish()
    }
}
