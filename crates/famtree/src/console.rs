//! Loading and saving whole family trees

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::count::count_members;
use crate::error::{Result, TreeError};
use crate::normalize::normalize_with_marker;
use crate::person::Person;
use crate::preview::PreviewHost;
use crate::session::TreeSession;
use crate::store::{AuthProvider, BlobStore, DocumentStore};

/// Result of trying to open a tree.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The tree is loaded and editable
    Ready(TreeSession),

    /// Nothing to edit yet: not signed in, not found, or the store failed.
    /// Callers keep showing a loading state.
    Pending,
}

impl LoadOutcome {
    /// The session, if the tree is ready.
    pub fn ready(self) -> Option<TreeSession> {
        match self {
            LoadOutcome::Ready(session) => Some(session),
            LoadOutcome::Pending => None,
        }
    }

    /// Whether the tree is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadOutcome::Pending)
    }
}

/// Root-level orchestration: opens trees from the document store, hands
/// out editing sessions and writes them back.
#[derive(Clone)]
pub struct FamilyConsole {
    config: EditorConfig,
    auth: Arc<dyn AuthProvider>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    previews: Arc<dyn PreviewHost>,
}

impl FamilyConsole {
    /// Wire a console to its collaborators.
    pub fn new(
        config: EditorConfig,
        auth: Arc<dyn AuthProvider>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        previews: Arc<dyn PreviewHost>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            auth,
            documents,
            blobs,
            previews,
        })
    }

    /// Console configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Blob store used for photos.
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Load and normalize the tree stored under `id`.
    ///
    /// Every failure is reported as [`LoadOutcome::Pending`]; the reason is
    /// only logged.
    pub async fn open(&self, id: &str) -> LoadOutcome {
        let Some(user) = self.auth.current_user() else {
            debug!(id = %id, "not signed in; tree stays pending");
            return LoadOutcome::Pending;
        };

        let raw = match self.documents.load(&self.config.collection, id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(id = %id, "no stored tree");
                return LoadOutcome::Pending;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to load tree");
                return LoadOutcome::Pending;
            }
        };

        let root = match normalize_with_marker(&raw, self.config.spouse_marker) {
            Ok(root) => root,
            Err(e) => {
                warn!(id = %id, error = %e, "stored tree is unusable");
                return LoadOutcome::Pending;
            }
        };

        match self.start(root) {
            Ok(session) => {
                info!(id = %id, user = %user.uid, "loaded tree");
                LoadOutcome::Ready(session)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "could not start session");
                LoadOutcome::Pending
            }
        }
    }

    /// Start a session over an in-memory tree (e.g. a freshly created one).
    pub fn start(&self, root: Person) -> Result<TreeSession> {
        TreeSession::new(root, self.config.clone(), Arc::clone(&self.previews))
    }

    /// Write the whole tree as one document keyed by the root id.
    ///
    /// The write replaces whatever is stored; concurrent sessions on the
    /// same tree overwrite each other and the last save wins.
    pub async fn save(&self, session: &TreeSession) -> Result<()> {
        let id = session.root().id.clone();
        let document = session.to_document()?;
        match self
            .documents
            .save(&self.config.collection, &id, &document)
            .await
        {
            Ok(()) => {
                info!(id = %id, members = session.member_count(), "saved tree");
                Ok(())
            }
            Err(source) => {
                warn!(id = %id, error = %source, "failed to save tree");
                Err(TreeError::Save { id, source })
            }
        }
    }

    /// Normalize a raw record and store it under its root id.
    pub async fn import(&self, raw: &serde_json::Value) -> Result<TreeSession> {
        let session = self.start(normalize_with_marker(raw, self.config.spouse_marker)?)?;
        self.save(&session).await?;
        Ok(session)
    }

    /// Family size of the stored tree `id`, or `None` while it is pending.
    pub async fn family_size(&self, id: &str) -> Option<usize> {
        let session = self.open(id).await.ready()?;
        Some(count_members(Some(session.root())))
    }
}

impl std::fmt::Debug for FamilyConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FamilyConsole")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
