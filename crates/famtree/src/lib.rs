//! # Famtree
//!
//! Editing core for a family tree stored as one document per family.
//!
//! A family is a tree of [`Person`] values: each person owns at most one
//! spouse and an ordered list of children. Trees are loaded from loosely
//! shaped stored records, normalized into that canonical shape, edited one
//! node at a time and written back as a single document.
//!
//! ## Architecture
//!
//! - **Normalize**: raw stored JSON to canonical [`Person`] trees
//! - **Allocator**: session-wide [`IdRegistry`] for child and spouse ids
//! - **Editor**: recursive [`NodeEditor`] over one node and its descendants
//! - **Session**: [`TreeSession`] holding the authoritative tree and previews
//! - **Console**: [`FamilyConsole`] loading and saving through the
//!   document, blob and auth collaborators in [`store`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod config;
pub mod console;
pub mod count;
pub mod editor;
pub mod error;
pub mod normalize;
pub mod path;
pub mod person;
pub mod preview;
pub mod session;
pub mod store;

// Re-export main types
pub use allocator::IdRegistry;
pub use config::EditorConfig;
pub use console::{FamilyConsole, LoadOutcome};
pub use count::count_members;
pub use editor::NodeEditor;
pub use error::{ConfigError, Result, StoreError, TreeError};
pub use normalize::{normalize, normalize_with_marker};
pub use path::{NodePath, Step};
pub use person::{Field, Person, Status};
pub use preview::{LocalPreview, MemoryPreviewHost, PreviewCache, PreviewHost};
pub use session::{Confirm, NodeEntry, TreeSession};
pub use store::{
    AuthProvider, BlobRef, BlobStore, DocumentStore, FsBlobStore, FsDocumentStore,
    MemoryBlobStore, MemoryDocumentStore, StaticAuth, User,
};

/// Famtree version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
