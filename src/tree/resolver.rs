//! Path resolution between module paths and module ids

use crate::error::CatalogError;
use crate::model::Module;
use crate::store::EntityStore;
use crate::tree::path::ModulePath;
use crate::types::EntityId;
use std::collections::HashSet;

/// Translates `/`-delimited module paths to module ids and back.
pub struct PathResolver<'a> {
    store: &'a EntityStore,
}

impl<'a> PathResolver<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Resolve a path string to a module id.
    ///
    /// The first segment is matched by exact name against the root index, each
    /// following segment against the current module's child list. When several
    /// entries share a name, the first in stored order wins.
    ///
    /// Any unresolvable path yields `Ok(None)`; only backend failures are errors.
    pub fn resolve_path(&self, path: &str) -> Result<Option<EntityId>, CatalogError> {
        match ModulePath::parse(path) {
            Some(path) => self.resolve(&path),
            None => Ok(None),
        }
    }

    pub fn resolve(&self, path: &ModulePath) -> Result<Option<EntityId>, CatalogError> {
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return Ok(None);
        };

        let roots = self.store.backend().load_root_index()?;
        let Some(root) = roots.iter().find(|r| r.name == *first) else {
            return Ok(None);
        };

        let mut current = root.id;
        for segment in segments {
            let Some(module) = self.store.get_module(&current)? else {
                return Ok(None);
            };
            match module.child_named(segment) {
                Some(child) => current = child.id,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolve a path and load the addressed module.
    pub fn get_by_path(&self, path: &str) -> Result<Option<Module>, CatalogError> {
        match self.resolve_path(path)? {
            Some(id) => self.store.get_module(&id),
            None => Ok(None),
        }
    }

    /// Compute a module's path by walking parent pointers up to a root.
    ///
    /// Returns `Ok(None)` when the module itself does not exist. A parent pointer
    /// to a missing module is `NotFound`; a cycle is `CycleDetected`.
    pub fn path_of(&self, id: &EntityId) -> Result<Option<ModulePath>, CatalogError> {
        let Some(module) = self.store.get_module(id)? else {
            return Ok(None);
        };

        let mut path = ModulePath::root(module.name.clone());
        let mut visited = HashSet::from([module.id]);
        let mut parent_id = module.parent_module_id;

        while let Some(pid) = parent_id {
            if !visited.insert(pid) {
                return Err(CatalogError::CycleDetected(*id));
            }
            let parent = self.store.require_module(&pid)?;
            path.push_front(&parent.name);
            parent_id = parent.parent_module_id;
        }
        Ok(Some(path))
    }

    /// Ids of every ancestor of `id`, nearest first.
    pub fn ancestors(&self, id: &EntityId) -> Result<Vec<EntityId>, CatalogError> {
        let module = self.store.require_module(id)?;
        let mut out = Vec::new();
        let mut parent_id = module.parent_module_id;
        while let Some(pid) = parent_id {
            if pid == *id || out.contains(&pid) {
                return Err(CatalogError::CycleDetected(*id));
            }
            out.push(pid);
            parent_id = self.store.require_module(&pid)?.parent_module_id;
        }
        Ok(out)
    }
}
