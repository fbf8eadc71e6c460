//! Turning loosely shaped stored records into canonical people

use serde_json::{Map, Value};
use tracing::warn;

use crate::allocator::IdRegistry;
use crate::config::EditorConfig;
use crate::error::{Result, TreeError};
use crate::path::NodePath;
use crate::person::{Person, Status};

/// Normalize a raw stored document into a canonical [`Person`] tree.
///
/// Absent optional fields become `None`, `status` collapses to the
/// deceased/none enumeration, `spouseObj` is followed only when it is an
/// object and `children` only when it is an array. An empty children array
/// is treated the same as a missing one. Nested records without an id are
/// given one, using the default spouse marker for spouses.
///
/// Normalizing the document of an already normalized tree yields the same
/// tree.
///
/// # Errors
///
/// Returns `InvalidRecord` when a node is not an object or the root has no
/// usable id.
pub fn normalize(raw: &Value) -> Result<Person> {
    normalize_with_marker(raw, EditorConfig::default().spouse_marker)
}

/// [`normalize`] with an explicit spouse marker for minted spouse ids.
pub fn normalize_with_marker(raw: &Value, spouse_marker: char) -> Result<Person> {
    let mut registry = IdRegistry::new(spouse_marker);
    collect_stored_ids(raw, &mut registry);
    Normalizer { registry }.node(raw, &NodePath::root(), Slot::Root)
}

/// Where a record sits, which decides how a missing id is replaced.
enum Slot<'a> {
    Root,
    Spouse { holder: &'a str },
    Child,
}

struct Normalizer {
    registry: IdRegistry,
}

impl Normalizer {
    fn node(&mut self, raw: &Value, path: &NodePath, slot: Slot<'_>) -> Result<Person> {
        let record = raw.as_object().ok_or_else(|| TreeError::InvalidRecord {
            path: path.to_string(),
            reason: format!("expected an object, got {}", json_kind(raw)),
        })?;

        let id = match (stored_id(record), slot) {
            (Some(id), _) => id,
            (None, Slot::Root) => {
                return Err(TreeError::InvalidRecord {
                    path: path.to_string(),
                    reason: "missing id".to_string(),
                });
            }
            (None, Slot::Spouse { holder }) => {
                let id = self.registry.spouse_id_for(holder);
                warn!(path = %path, id = %id, "record has no id, assigned one");
                id
            }
            (None, Slot::Child) => {
                let id = self.registry.next_child_id();
                warn!(path = %path, id = %id, "record has no id, assigned one");
                id
            }
        };

        let spouse = match record.get("spouseObj") {
            Some(spouse @ Value::Object(_)) => Some(Box::new(self.node(
                spouse,
                &path.spouse(),
                Slot::Spouse { holder: &id },
            )?)),
            _ => None,
        };

        Ok(Person {
            id,
            name: scalar_text(record.get("name")).unwrap_or_default(),
            image: optional_text(record, "image"),
            address: optional_text(record, "address"),
            phone: optional_text(record, "phone"),
            occupation: optional_text(record, "occupation"),
            status: Status::from_marker(record.get("status").and_then(Value::as_str)),
            spouse,
            children: self.children(record.get("children"), path)?,
        })
    }

    fn children(&mut self, raw: Option<&Value>, path: &NodePath) -> Result<Option<Vec<Person>>> {
        let Some(Value::Array(items)) = raw else {
            return Ok(None);
        };

        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if !item.is_object() {
                warn!(
                    path = %path.child(index),
                    kind = json_kind(item),
                    "skipping child entry that is not a record"
                );
                continue;
            }
            children.push(self.node(item, &path.child(children.len()), Slot::Child)?);
        }

        Ok(Some(children).filter(|c| !c.is_empty()))
    }
}

/// Register every id already present in the document, so minted ids never
/// collide with one that appears later in the walk.
fn collect_stored_ids(raw: &Value, registry: &mut IdRegistry) {
    let Some(record) = raw.as_object() else {
        return;
    };
    if let Some(id) = stored_id(record) {
        registry.register(id);
    }
    if let Some(spouse @ Value::Object(_)) = record.get("spouseObj") {
        collect_stored_ids(spouse, registry);
    }
    if let Some(Value::Array(items)) = record.get("children") {
        for item in items {
            collect_stored_ids(item, registry);
        }
    }
}

fn stored_id(record: &Map<String, Value>) -> Option<String> {
    scalar_text(record.get("id")).filter(|id| !id.is_empty())
}

/// Strings as-is, numbers stringified, anything else absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn optional_text(record: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_text(record.get(key)).filter(|s| !s.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
