//! Tree edits: attach, detach, and relocate child modules
//!
//! Every edit touches two records, child and parent, as separate writes. The
//! writes are not atomic. Creating or attaching writes the child first, so an
//! interruption leaves a module reachable by id but not by path; the entity
//! records stay the source of truth and only the tree overlay degrades.

use crate::error::CatalogError;
use crate::model::{validate_name, Module, NewModule};
use crate::store::EntityStore;
use crate::types::EntityId;
use tracing::info;

/// Maintains bidirectional parent/child references on top of the entity store.
pub struct TreeMutator<'a> {
    store: &'a EntityStore,
}

impl<'a> TreeMutator<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Create a module as a child of `parent_id`.
    ///
    /// The new module is not added to the root index.
    pub fn create_sub_module(
        &self,
        parent_id: &EntityId,
        data: NewModule,
    ) -> Result<EntityId, CatalogError> {
        let parent = self.store.require_module(parent_id)?;
        let name = validate_name(&data.name)?;

        let mut child = Module::new(name, data.description);
        child.parent_module_id = Some(parent.id);
        self.store.save_module(&child)?;

        self.append_child(parent, &child)?;

        info!(
            module_id = %child.id,
            parent_id = %parent_id,
            name = %child.name,
            "Created sub-module"
        );
        Ok(child.id)
    }

    /// Remove the edge between `parent_id` and `child_id`.
    ///
    /// Both modules must exist and the parent's child list must contain the
    /// child. The child keeps its record but loses its parent pointer; it is not
    /// added back to the root index.
    pub fn remove_sub_module(
        &self,
        parent_id: &EntityId,
        child_id: &EntityId,
    ) -> Result<(), CatalogError> {
        let mut parent = self.store.require_module(parent_id)?;
        let mut child = self.store.require_module(child_id)?;

        if !parent.has_child(child_id) {
            return Err(CatalogError::PreconditionFailed(format!(
                "module {} has no child {}",
                parent_id, child_id
            )));
        }

        parent.children.retain(|c| c.id != *child_id);
        parent.touch();
        self.store.save_module(&parent)?;

        child.parent_module_id = None;
        child.touch();
        self.store.save_module(&child)?;

        info!(module_id = %child_id, parent_id = %parent_id, "Detached sub-module");
        Ok(())
    }

    /// Move `child_id` under `new_parent_id`.
    ///
    /// Detaches from the current parent first (with the same precondition as
    /// [`remove_sub_module`](Self::remove_sub_module)), then attaches. The two
    /// phases are not atomic; an interruption between them leaves the child
    /// parentless. Moving a module under itself or a descendant is refused.
    pub fn move_sub_module(
        &self,
        child_id: &EntityId,
        new_parent_id: &EntityId,
    ) -> Result<(), CatalogError> {
        let child = self.store.require_module(child_id)?;
        self.store.require_module(new_parent_id)?;

        if child_id == new_parent_id
            || self.store.resolver().ancestors(new_parent_id)?.contains(child_id)
        {
            return Err(CatalogError::PreconditionFailed(format!(
                "cannot move module {} under itself or its descendant {}",
                child_id, new_parent_id
            )));
        }

        let old_parent = child.parent_module_id;
        if let Some(old_parent_id) = old_parent {
            self.remove_sub_module(&old_parent_id, child_id)?;
        }

        // Reload both sides: the detach above rewrote them.
        let mut child = self.store.require_module(child_id)?;
        child.parent_module_id = Some(*new_parent_id);
        child.touch();
        self.store.save_module(&child)?;

        let new_parent = self.store.require_module(new_parent_id)?;
        self.append_child(new_parent, &child)?;

        info!(
            module_id = %child_id,
            from = ?old_parent,
            parent_id = %new_parent_id,
            "Moved sub-module"
        );
        Ok(())
    }

    fn append_child(&self, mut parent: Module, child: &Module) -> Result<(), CatalogError> {
        parent.children.push(child.to_ref());
        parent.touch();
        self.store.save_module(&parent)
    }
}
