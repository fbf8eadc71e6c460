//! Recursive node editor
//!
//! A [`NodeEditor`] edits exactly one person. It hands out further editors
//! for the spouse and each child, one level deeper, all sharing the same
//! id registry, preview cache and configuration. Every edit builds the
//! replacement value for the node and stores it in the slot that owns it,
//! so changes are visible to the root without any back-pointers.

use tracing::{debug, warn};

use crate::allocator::IdRegistry;
use crate::config::EditorConfig;
use crate::error::{Result, TreeError};
use crate::path::Step;
use crate::person::{Field, Person};
use crate::preview::PreviewCache;
use crate::store::BlobStore;

/// Editor for one node of the tree.
#[derive(Debug)]
pub struct NodeEditor<'s> {
    node: &'s mut Person,
    registry: &'s mut IdRegistry,
    previews: &'s mut PreviewCache,
    config: &'s EditorConfig,
    depth: usize,
}

impl<'s> NodeEditor<'s> {
    /// Create an editor for `node` at `depth`.
    pub fn new(
        node: &'s mut Person,
        registry: &'s mut IdRegistry,
        previews: &'s mut PreviewCache,
        config: &'s EditorConfig,
        depth: usize,
    ) -> Self {
        Self {
            node,
            registry,
            previews,
            config,
            depth,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// The person being edited.
    pub fn person(&self) -> &Person {
        self.node
    }

    /// Nesting depth; the root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Palette index for this depth.
    pub fn palette_slot(&self) -> usize {
        self.config.palette_slot(self.depth)
    }

    /// Local preview URL for this person's photo, if one is live.
    pub fn preview_url(&self) -> Option<&str> {
        self.previews.get(&self.node.id).map(|p| p.url())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Field edits
    // ═══════════════════════════════════════════════════════════════════

    /// Replace one field of this person.
    ///
    /// Editing the image field directly drops any local preview, which
    /// would otherwise keep showing the previous photo.
    pub fn edit(&mut self, field: Field, value: Option<&str>) {
        if field == Field::Image {
            self.previews.release(&self.node.id);
        }
        self.replace_field(field, value);
    }

    fn replace_field(&mut self, field: Field, value: Option<&str>) {
        debug!(id = %self.node.id, %field, "editing field");
        *self.node = self.node.with_field(field, value);
    }

    /// Upload a new photo and point the image field at it.
    ///
    /// A local preview is shown before the upload starts. The blob key is
    /// derived from the person's id, so a new photo overwrites the old one.
    /// If the upload fails the preview is released, the image field keeps
    /// its previous value and the error is returned for the caller to
    /// report.
    pub async fn attach_image(&mut self, bytes: Vec<u8>, blobs: &dyn BlobStore) -> Result<String> {
        let id = self.node.id.clone();
        let key = self.config.image_key(&id);
        self.previews.show(&id, &bytes);

        match blobs.put(&key, bytes).await {
            Ok(reference) => {
                debug!(id = %id, key = %key, "photo uploaded");
                self.replace_field(Field::Image, Some(reference.as_str()));
                Ok(reference.0)
            }
            Err(source) => {
                warn!(id = %id, key = %key, error = %source, "photo upload failed");
                self.previews.release(&id);
                Err(TreeError::Upload { key, source })
            }
        }
    }

    /// Clear the photo and release any local preview.
    pub fn remove_image(&mut self) {
        self.edit(Field::Image, None);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Structure edits
    // ═══════════════════════════════════════════════════════════════════

    /// Give this person a new spouse called `name`.
    ///
    /// Blank names are ignored. A spouse already in the slot is discarded
    /// with everything it owns. Returns the new spouse's id.
    pub fn add_spouse(&mut self, name: &str) -> Option<String> {
        let name = non_blank(name)?;
        self.remove_spouse();
        let id = self.registry.spouse_id_for(&self.node.id);
        debug!(holder = %self.node.id, id = %id, "adding spouse");
        self.node.spouse = Some(Box::new(Person::new(id.clone(), name)));
        Some(id)
    }

    /// Append a new child called `name`.
    ///
    /// Blank names are ignored. Returns the new child's id.
    pub fn add_child(&mut self, name: &str) -> Option<String> {
        let name = non_blank(name)?;
        let id = self.registry.next_child_id();
        debug!(parent = %self.node.id, id = %id, "adding child");
        self.node
            .children
            .get_or_insert_with(Vec::new)
            .push(Person::new(id.clone(), name));
        Some(id)
    }

    /// Discard the spouse and everything it owns.
    pub fn remove_spouse(&mut self) -> Option<Person> {
        let removed = *self.node.spouse.take()?;
        self.previews.release_subtree(&removed);
        debug!(holder = %self.node.id, id = %removed.id, "removed spouse");
        Some(removed)
    }

    /// Discard the child at `index` and everything it owns.
    ///
    /// Removing the last child leaves `children` absent rather than empty.
    pub fn remove_child(&mut self, index: usize) -> Option<Person> {
        let children = self.node.children.as_mut()?;
        if index >= children.len() {
            return None;
        }
        let removed = children.remove(index);
        if children.is_empty() {
            self.node.children = None;
        }
        self.previews.release_subtree(&removed);
        debug!(parent = %self.node.id, id = %removed.id, "removed child");
        Some(removed)
    }

    /// Remove whatever `step` points at.
    pub fn remove(&mut self, step: Step) -> Option<Person> {
        match step {
            Step::Spouse => self.remove_spouse(),
            Step::Child(index) => self.remove_child(index),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Recursion
    // ═══════════════════════════════════════════════════════════════════

    /// Editor for the spouse, one level deeper.
    pub fn spouse(&mut self) -> Option<NodeEditor<'_>> {
        let node = self.node.spouse.as_deref_mut()?;
        Some(NodeEditor {
            node,
            registry: &mut *self.registry,
            previews: &mut *self.previews,
            config: self.config,
            depth: self.depth + 1,
        })
    }

    /// Editor for the child at `index`, one level deeper.
    pub fn child(&mut self, index: usize) -> Option<NodeEditor<'_>> {
        let node = self.node.children.as_mut()?.get_mut(index)?;
        Some(NodeEditor {
            node,
            registry: &mut *self.registry,
            previews: &mut *self.previews,
            config: self.config,
            depth: self.depth + 1,
        })
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.node.children().len()
    }

    /// Move this editor one step down, keeping the full borrow.
    pub fn descend(self, step: Step) -> Option<NodeEditor<'s>> {
        let NodeEditor {
            node,
            registry,
            previews,
            config,
            depth,
        } = self;
        let next = match step {
            Step::Spouse => node.spouse.as_deref_mut()?,
            Step::Child(index) => node.children.as_mut()?.get_mut(index)?,
        };
        Some(NodeEditor {
            node: next,
            registry,
            previews,
            config,
            depth: depth + 1,
        })
    }
}

fn non_blank(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
