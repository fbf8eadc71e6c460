//! Error types for family tree editing

use thiserror::Error;

/// Main error type for tree operations
#[derive(Error, Debug)]
pub enum TreeError {
    /// No node lives at the given path
    #[error("No node at path {path}")]
    NodeNotFound {
        /// Path that was requested
        path: String,
    },

    /// The root has no parent slot to be removed from
    #[error("The root person cannot be deleted")]
    CannotDeleteRoot,

    /// A loaded record could not be turned into a person
    #[error("Invalid record at {path}: {reason}")]
    InvalidRecord {
        /// Path of the offending node inside the document
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unknown field name in an edit
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Malformed node path
    #[error("Invalid node path `{path}`: {reason}")]
    InvalidPath {
        /// The text that failed to parse
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Photo upload failed; the image field was left unchanged
    #[error("Failed to upload {key}: {source}")]
    Upload {
        /// Storage key of the attempted upload
        key: String,
        /// Underlying store failure
        source: StoreError,
    },

    /// Whole-tree save failed
    #[error("Failed to save tree {id}: {source}")]
    Save {
        /// Root id the document is keyed by
        id: String,
        /// Underlying store failure
        source: StoreError,
    },

    /// Store failure outside upload/save (e.g. resolving an image URL)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid editor configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON encoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by document, blob and auth collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or refused the call
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Local I/O failure in a filesystem-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes were not valid JSON
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A blob reference that the store does not know
    #[error("Unknown blob reference: {0}")]
    UnknownBlob(String),
}

/// Invalid configuration values
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The spouse marker would make spouse ids look numeric
    #[error("Spouse marker must not be a digit, got `{0}`")]
    NumericSpouseMarker(char),

    /// The depth palette needs at least one entry
    #[error("Palette must contain at least one colour")]
    EmptyPalette,

    /// Documents need a collection to live in
    #[error("Collection name must not be empty")]
    EmptyCollection,

    /// Configuration text could not be parsed
    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
