//! Session-wide id registry and allocation

use indexmap::IndexSet;
use tracing::debug;

use crate::person::Person;

/// Every id known during one editing session.
///
/// One registry is shared by every node editor of a tree, so an id minted
/// under one branch is visible to allocations everywhere else. Ids are
/// never removed: a deleted node's id stays reserved for the rest of the
/// session.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    ids: IndexSet<String>,
    spouse_marker: char,
}

impl IdRegistry {
    /// Create an empty registry using the given spouse marker.
    pub fn new(spouse_marker: char) -> Self {
        Self {
            ids: IndexSet::new(),
            spouse_marker,
        }
    }

    /// Create a registry holding every id in `root`'s tree.
    pub fn from_tree(root: &Person, spouse_marker: char) -> Self {
        let mut registry = Self::new(spouse_marker);
        for id in root.ids() {
            registry.register(id);
        }
        registry
    }

    /// Record an id as in use. Returns `false` if it was already known.
    pub fn register(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Whether an id is known.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of known ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no ids are known.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Known ids in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The marker appended to a holder id to form a spouse id.
    pub fn spouse_marker(&self) -> char {
        self.spouse_marker
    }

    /// Mint and register the next child id.
    ///
    /// The digits of every known id are parsed as a number (ids without
    /// digits count as 0) and the result is one past the largest.
    pub fn next_child_id(&mut self) -> String {
        let max = self.ids.iter().map(|id| numeric_part(id)).max().unwrap_or(0);
        let mut candidate = max.saturating_add(1);
        // Only reachable once the numeric space saturates.
        while self.contains(&candidate.to_string()) {
            candidate = candidate.wrapping_add(1);
        }
        let id = candidate.to_string();
        debug!(id = %id, "allocated child id");
        self.register(id.clone());
        id
    }

    /// Mint and register a spouse id for `holder_id`.
    ///
    /// The id is the holder's id plus the marker. If that id was already
    /// used this session the marker is repeated until it is free.
    pub fn spouse_id_for(&mut self, holder_id: &str) -> String {
        let mut id = format!("{}{}", holder_id, self.spouse_marker);
        while self.contains(&id) {
            id.push(self.spouse_marker);
        }
        debug!(holder = %holder_id, id = %id, "allocated spouse id");
        self.register(id.clone());
        id
    }
}

/// Numeric value of the digits in an id, with everything else stripped.
fn numeric_part(id: &str) -> u64 {
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
