//! Living status of a person

use serde::{Serialize, Serializer};

/// Status marker stored on every person.
///
/// Persisted as the literal `"Deceased"` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// No status recorded
    #[default]
    None,

    /// The person has died
    Deceased,
}

impl Status {
    /// The literal persisted for [`Status::Deceased`].
    pub const DECEASED: &'static str = "Deceased";

    /// Map a loaded or edited value onto the enumeration.
    ///
    /// Only the exact deceased literal is recognised; anything else,
    /// including a missing value, is `None`.
    pub fn from_marker(value: Option<&str>) -> Self {
        match value {
            Some(Self::DECEASED) => Status::Deceased,
            _ => Status::None,
        }
    }

    /// The persisted marker, if any.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Status::None => None,
            Status::Deceased => Some(Self::DECEASED),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.marker() {
            Some(marker) => serializer.serialize_str(marker),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marker() {
        assert_eq!(Status::from_marker(Some("Deceased")), Status::Deceased);
        assert_eq!(Status::from_marker(Some("deceased")), Status::None);
        assert_eq!(Status::from_marker(None), Status::None);
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            serde_json::to_string(&Status::Deceased).unwrap(),
            "\"Deceased\""
        );
        assert_eq!(serde_json::to_string(&Status::None).unwrap(), "null");
    }
}
