//! Editor configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration shared by every node editor in a session.
///
/// Every field has a default, so a partial JSON file only needs to name
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Document collection family trees are stored in
    pub collection: String,

    /// Blob key prefix for person photos
    pub image_prefix: String,

    /// File extension for person photos
    pub image_extension: String,

    /// Suffix appended to a holder's id to form its spouse's id
    pub spouse_marker: char,

    /// Colours cycled by tree depth
    pub palette: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            collection: "families".to_string(),
            image_prefix: "images/".to_string(),
            image_extension: "jpg".to_string(),
            spouse_marker: 's',
            palette: ["#f1f8e9", "#e3f2fd", "#fff3e0", "#fce4ec", "#ede7f6"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EditorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Use a different document collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Use a different spouse id marker.
    pub fn with_spouse_marker(mut self, marker: char) -> Self {
        self.spouse_marker = marker;
        self
    }

    /// Use a different depth palette.
    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// Check the invariants the editor relies on.
    ///
    /// A digit marker would let `"1" + marker` collide with a numeric
    /// child id, so it is rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spouse_marker.is_ascii_digit() {
            return Err(ConfigError::NumericSpouseMarker(self.spouse_marker));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }
        Ok(())
    }

    /// Blob key for a person's photo, e.g. `images/7.jpg`.
    pub fn image_key(&self, person_id: &str) -> String {
        format!(
            "{}{}.{}",
            self.image_prefix, person_id, self.image_extension
        )
    }

    /// Palette index for a given depth.
    pub fn palette_slot(&self, depth: usize) -> usize {
        depth % self.palette.len().max(1)
    }

    /// Palette colour for a given depth.
    pub fn colour_for_depth(&self, depth: usize) -> Option<&str> {
        self.palette.get(self.palette_slot(depth)).map(String::as_str)
    }
}
