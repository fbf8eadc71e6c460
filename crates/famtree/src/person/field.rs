//! Editable person fields

use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// A single editable field of a [`Person`](super::Person).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Display name
    Name,
    /// Photo reference
    Image,
    /// Postal address
    Address,
    /// Phone number
    Phone,
    /// Occupation
    Occupation,
    /// Living status
    Status,
}

impl Field {
    /// All fields in document order.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Image,
        Field::Address,
        Field::Phone,
        Field::Occupation,
        Field::Status,
    ];

    /// The document key for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Image => "image",
            Field::Address => "address",
            Field::Phone => "phone",
            Field::Occupation => "occupation",
            Field::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TreeError::UnknownField(s.to_string()))
    }
}
