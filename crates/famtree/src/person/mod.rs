//! The family tree node type

mod field;
mod status;

pub use field::Field;
pub use status::Status;

use serde::Serialize;

use crate::error::Result;

/// One member of the family tree.
///
/// A person exclusively owns its spouse and children, so the whole family
/// is a plain tree of values: no node has two parents and nothing is shared.
/// Absent optional values are always `None`, and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Unique across the whole tree
    pub id: String,

    /// Display name; may be empty while editing
    pub name: String,

    /// Blob reference of the person's photo
    pub image: Option<String>,

    /// Postal address
    pub address: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Occupation
    pub occupation: Option<String>,

    /// Living status
    pub status: Status,

    /// Spouse, owned by this node
    #[serde(rename = "spouseObj")]
    pub spouse: Option<Box<Person>>,

    /// Children in display order; never `Some(empty)` once canonical
    pub children: Option<Vec<Person>>,
}

impl Person {
    /// Create a person with no optional data, spouse or children.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            address: None,
            phone: None,
            occupation: None,
            status: Status::None,
            spouse: None,
            children: None,
        }
    }

    /// Attach a spouse (builder pattern)
    pub fn with_spouse(mut self, spouse: Person) -> Self {
        self.spouse = Some(Box::new(spouse));
        self
    }

    /// Append a child (builder pattern)
    pub fn with_child(mut self, child: Person) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Return a copy of this person with exactly one field replaced.
    ///
    /// Absent or empty values for optional fields become `None`. An absent
    /// name becomes the empty string. Every other field, including the
    /// spouse and children subtrees, is carried over untouched.
    pub fn with_field(&self, field: Field, value: Option<&str>) -> Person {
        let mut next = self.clone();
        next.set_field(field, value);
        next
    }

    /// In-place form of [`Person::with_field`].
    pub fn set_field(&mut self, field: Field, value: Option<&str>) {
        let optional = value.filter(|v| !v.is_empty()).map(str::to_string);
        match field {
            Field::Name => self.name = value.unwrap_or_default().to_string(),
            Field::Image => self.image = optional,
            Field::Address => self.address = optional,
            Field::Phone => self.phone = optional,
            Field::Occupation => self.occupation = optional,
            Field::Status => self.status = Status::from_marker(value),
        }
    }

    /// Current value of a field, as it would be written to a document.
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(self.name.as_str()),
            Field::Image => self.image.as_deref(),
            Field::Address => self.address.as_deref(),
            Field::Phone => self.phone.as_deref(),
            Field::Occupation => self.occupation.as_deref(),
            Field::Status => self.status.marker(),
        }
    }

    /// Spouse, if any.
    pub fn spouse(&self) -> Option<&Person> {
        self.spouse.as_deref()
    }

    /// Children as a slice; empty when there are none.
    pub fn children(&self) -> &[Person] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether this person is marked deceased.
    pub fn is_deceased(&self) -> bool {
        self.status == Status::Deceased
    }

    /// Collapse every empty optional string and empty children sequence to
    /// `None`, recursively. Applying it twice changes nothing.
    pub fn canonical(mut self) -> Person {
        for slot in [
            &mut self.image,
            &mut self.address,
            &mut self.phone,
            &mut self.occupation,
        ] {
            if slot.as_deref() == Some("") {
                *slot = None;
            }
        }
        self.spouse = self.spouse.map(|s| Box::new((*s).canonical()));
        self.children = self
            .children
            .map(|kids| kids.into_iter().map(Person::canonical).collect::<Vec<_>>())
            .filter(|kids| !kids.is_empty());
        self
    }

    /// Every id in this subtree: self, then the spouse subtree, then each
    /// child subtree in order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.id.as_str());
        if let Some(spouse) = self.spouse() {
            spouse.collect_ids(out);
        }
        for child in self.children() {
            child.collect_ids(out);
        }
    }

    /// Serialize this subtree to the persisted document shape.
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
