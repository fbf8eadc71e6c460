//! The root container of one editing session

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::allocator::IdRegistry;
use crate::config::EditorConfig;
use crate::count::count_members;
use crate::editor::NodeEditor;
use crate::error::{Result, TreeError};
use crate::path::{NodePath, Step};
use crate::person::Person;
use crate::preview::{PreviewCache, PreviewHost};
use crate::store::{BlobRef, BlobStore};

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Return `true` to go ahead.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// One row of a pre-order walk over the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// Where the node lives
    pub path: NodePath,
    /// Nesting depth; the root is 0
    pub depth: usize,
    /// Palette index for the depth
    pub palette_slot: usize,
    /// Person id
    pub id: String,
    /// Person name
    pub name: String,
    /// Whether the node sits in a spouse slot
    pub is_spouse: bool,
    /// Whether the person is marked deceased
    pub deceased: bool,
}

/// Authoritative in-memory copy of a family tree while it is being edited.
///
/// Holds the root person, the id registry shared by every node editor and
/// the live photo previews. Nothing is written anywhere until the tree is
/// saved as a whole; dropping the session releases every preview.
#[derive(Debug)]
pub struct TreeSession {
    root: Person,
    registry: IdRegistry,
    previews: PreviewCache,
    config: EditorConfig,
}

impl TreeSession {
    /// Start a session over `root`, registering every id already in it.
    pub fn new(root: Person, config: EditorConfig, host: Arc<dyn PreviewHost>) -> Result<Self> {
        config.validate()?;
        let registry = IdRegistry::from_tree(&root, config.spouse_marker);
        info!(root = %root.id, ids = registry.len(), "opened tree session");
        Ok(Self {
            root,
            registry,
            previews: PreviewCache::new(host),
            config,
        })
    }

    /// The whole tree.
    pub fn root(&self) -> &Person {
        &self.root
    }

    /// Session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The id registry.
    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    /// Live local previews.
    pub fn previews(&self) -> &PreviewCache {
        &self.previews
    }

    /// The person at `path`.
    pub fn node(&self, path: &NodePath) -> Result<&Person> {
        let mut node = &self.root;
        for step in path.steps() {
            let next = match step {
                Step::Spouse => node.spouse(),
                Step::Child(index) => node.children().get(*index),
            };
            node = next.ok_or_else(|| not_found(path))?;
        }
        Ok(node)
    }

    /// Editor for the root person.
    pub fn editor(&mut self) -> NodeEditor<'_> {
        NodeEditor::new(
            &mut self.root,
            &mut self.registry,
            &mut self.previews,
            &self.config,
            0,
        )
    }

    /// Editor for the person at `path`.
    pub fn editor_at(&mut self, path: &NodePath) -> Result<NodeEditor<'_>> {
        let mut editor = self.editor();
        for step in path.steps() {
            editor = editor.descend(*step).ok_or_else(|| not_found(path))?;
        }
        Ok(editor)
    }

    /// Delete the person at `path` together with everything it owns.
    ///
    /// The user is asked first; a declined confirmation returns `Ok(false)`
    /// and leaves the tree as it was.
    ///
    /// # Errors
    ///
    /// Returns `CannotDeleteRoot` for the root and `NodeNotFound` for a
    /// path with nothing at it.
    pub fn delete(&mut self, path: &NodePath, confirm: &dyn Confirm) -> Result<bool> {
        let (parent, step) = path.split_last().ok_or(TreeError::CannotDeleteRoot)?;
        let name = self.node(path)?.name.clone();

        if !confirm.confirm(&format!("Delete {} and everyone they hold?", name)) {
            debug!(path = %path, "delete declined");
            return Ok(false);
        }

        let removed = self
            .editor_at(&parent)?
            .remove(step)
            .ok_or_else(|| not_found(path))?;
        info!(path = %path, id = %removed.id, "deleted subtree");
        Ok(true)
    }

    /// Every node in display order: a person, then its spouse subtree, then
    /// each child subtree.
    pub fn walk(&self) -> Vec<NodeEntry> {
        let mut out = Vec::new();
        self.walk_node(&self.root, NodePath::root(), 0, false, &mut out);
        out
    }

    fn walk_node(
        &self,
        node: &Person,
        path: NodePath,
        depth: usize,
        is_spouse: bool,
        out: &mut Vec<NodeEntry>,
    ) {
        out.push(NodeEntry {
            path: path.clone(),
            depth,
            palette_slot: self.config.palette_slot(depth),
            id: node.id.clone(),
            name: node.name.clone(),
            is_spouse,
            deceased: node.is_deceased(),
        });
        if let Some(spouse) = node.spouse() {
            self.walk_node(spouse, path.spouse(), depth + 1, true, out);
        }
        for (index, child) in node.children().iter().enumerate() {
            self.walk_node(child, path.child(index), depth + 1, false, out);
        }
    }

    /// Family size as shown on the overview screen.
    pub fn member_count(&self) -> usize {
        count_members(Some(&self.root))
    }

    /// URL to display for the photo at `path`.
    ///
    /// A live local preview wins; otherwise the stored reference is
    /// resolved through `blobs`.
    pub async fn image_url(&self, path: &NodePath, blobs: &dyn BlobStore) -> Result<Option<String>> {
        let node = self.node(path)?;
        if let Some(preview) = self.previews.get(&node.id) {
            return Ok(Some(preview.url().to_string()));
        }
        match &node.image {
            Some(image) => Ok(Some(blobs.resolve(&BlobRef(image.clone())).await?)),
            None => Ok(None),
        }
    }

    /// The canonical document for the whole tree.
    pub fn to_document(&self) -> Result<Value> {
        self.root.clone().canonical().to_document()
    }
}

fn not_found(path: &NodePath) -> TreeError {
    TreeError::NodeNotFound {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::MemoryPreviewHost;

    fn session(root: Person) -> TreeSession {
        TreeSession::new(
            root,
            EditorConfig::default(),
            Arc::new(MemoryPreviewHost::new()),
        )
        .unwrap()
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = TreeSession::new(
            Person::new("1", "Ada"),
            EditorConfig::default().with_spouse_marker('9'),
            Arc::new(MemoryPreviewHost::new()),
        );
        assert!(matches!(result, Err(TreeError::Config(_))));
    }

    #[test]
    fn test_node_lookup() {
        let s = session(
            Person::new("1", "Ada").with_child(Person::new("2", "Bo").with_spouse(Person::new("2s", "Cy"))),
        );
        assert_eq!(s.node(&"/0/s".parse().unwrap()).unwrap().id, "2s");
        assert!(matches!(
            s.node(&"/1".parse().unwrap()),
            Err(TreeError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_root_refused() {
        let mut s = session(Person::new("1", "Ada"));
        assert!(matches!(
            s.delete(&NodePath::root(), &yes),
            Err(TreeError::CannotDeleteRoot)
        ));
    }

    #[test]
    fn test_delete_declined() {
        let mut s = session(Person::new("1", "Ada").with_child(Person::new("2", "Bo")));
        assert!(!s.delete(&NodePath::root().child(0), &no).unwrap());
        assert_eq!(s.root().children().len(), 1);
    }

    #[test]
    fn test_delete_prompt_names_person() {
        let mut s = session(Person::new("1", "Ada").with_spouse(Person::new("1s", "Bert")));
        let asked = std::cell::RefCell::new(String::new());
        let confirm = |prompt: &str| {
            *asked.borrow_mut() = prompt.to_string();
            true
        };
        assert!(s.delete(&NodePath::root().spouse(), &confirm).unwrap());
        assert!(asked.borrow().contains("Bert"));
        assert_eq!(s.root().spouse, None);
    }

    #[test]
    fn test_walk_carries_depth() {
        let s = session(
            Person::new("1", "Ada")
                .with_spouse(Person::new("1s", "Bert"))
                .with_child(Person::new("2", "Bo").with_child(Person::new("3", "Cy"))),
        );
        let rows: Vec<_> = s
            .walk()
            .into_iter()
            .map(|e| (e.path.to_string(), e.depth, e.is_spouse))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("/".to_string(), 0, false),
                ("/s".to_string(), 1, true),
                ("/0".to_string(), 1, false),
                ("/0/0".to_string(), 2, false),
            ]
        );
    }
}
