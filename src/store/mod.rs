//! Entity Store
//!
//! Durable, key-addressed records for modules and endpoints, plus the root index
//! listing modules created without a parent. [`EntityStore`] implements the
//! record operations on top of a raw [`RecordBackend`].
//!
//! Lookups by id return `Ok(None)` for a missing record. Updates of a missing
//! record fail with `NotFound`. Every mutation refreshes the record's
//! `updated_at` timestamp.

pub mod backend;
pub mod memory;
pub mod persistence;

pub use backend::RecordBackend;
pub use memory::MemBackend;
pub use persistence::SledBackend;

use crate::error::CatalogError;
use crate::model::{
    validate_name, Endpoint, EndpointPatch, Module, ModulePatch, NameFilter, NewEndpoint,
    NewModule,
};
use crate::tree::{PathResolver, TreeMutator};
use crate::types::{EndpointRef, EntityId, ModuleRef};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handle to a record backend.
pub type SharedBackend = Arc<dyn RecordBackend + Send + Sync>;

/// Record-level operations over modules, endpoints, and the root index.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct EntityStore {
    backend: SharedBackend,
}

impl EntityStore {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemBackend::new()))
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Path resolution over this store.
    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(self)
    }

    /// Tree edits over this store.
    pub fn mutator(&self) -> TreeMutator<'_> {
        TreeMutator::new(self)
    }

    // --- Modules ---

    /// Create a standalone module and record it in the root index.
    pub fn create_module(&self, data: NewModule) -> Result<EntityId, CatalogError> {
        let name = validate_name(&data.name)?;
        let module = Module::new(name, data.description);
        self.backend.save_module(&module)?;

        let mut roots = self.backend.load_root_index()?;
        roots.push(module.to_ref());
        self.backend.save_root_index(&roots)?;

        debug!(module_id = %module.id, name = %module.name, "Created root module");
        Ok(module.id)
    }

    pub fn get_module(&self, id: &EntityId) -> Result<Option<Module>, CatalogError> {
        Ok(self.backend.load_module(id)?)
    }

    /// Patch a module's name and/or description.
    ///
    /// A rename is mirrored into the root index entry and the parent's child
    /// entry, when those exist.
    pub fn update_module(&self, id: &EntityId, patch: ModulePatch) -> Result<Module, CatalogError> {
        let mut module = self.require_module(id)?;
        let renamed_to = match patch.name {
            Some(ref name) => {
                let name = validate_name(name)?;
                (name != module.name).then_some(name)
            }
            None => None,
        };

        if let Some(ref name) = renamed_to {
            module.name = name.clone();
        }
        if let Some(description) = patch.description {
            module.description = description;
        }
        module.touch();
        self.backend.save_module(&module)?;

        if let Some(name) = renamed_to {
            self.propagate_module_rename(&module, &name)?;
        }

        debug!(module_id = %id, "Updated module");
        Ok(module)
    }

    fn propagate_module_rename(&self, module: &Module, name: &str) -> Result<(), CatalogError> {
        let mut roots = self.backend.load_root_index()?;
        if let Some(entry) = roots.iter_mut().find(|r| r.id == module.id) {
            entry.name = name.to_string();
            self.backend.save_root_index(&roots)?;
        }

        if let Some(parent_id) = module.parent_module_id {
            match self.backend.load_module(&parent_id)? {
                Some(mut parent) => {
                    if let Some(entry) = parent.children.iter_mut().find(|c| c.id == module.id) {
                        entry.name = name.to_string();
                        parent.touch();
                        self.backend.save_module(&parent)?;
                    }
                }
                None => warn!(
                    module_id = %module.id,
                    parent_id = %parent_id,
                    "Renamed module points at a missing parent"
                ),
            }
        }
        Ok(())
    }

    /// List root-index entries in index order, filtered by name.
    pub fn list_modules(&self, filter: &NameFilter) -> Result<Vec<ModuleRef>, CatalogError> {
        let roots = self.backend.load_root_index()?;
        Ok(roots.into_iter().filter(|r| filter.matches(&r.name)).collect())
    }

    /// Parentless modules that the root index does not list.
    ///
    /// These are left behind by detaching or moving a module whose old parent
    /// chain is gone; they are reachable by id only. Ordered by creation time.
    pub fn detached_modules(&self) -> Result<Vec<ModuleRef>, CatalogError> {
        let indexed: HashSet<EntityId> = self
            .backend
            .load_root_index()?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let mut detached: Vec<Module> = self
            .backend
            .scan_modules()?
            .into_iter()
            .filter(|m| m.is_root() && !indexed.contains(&m.id))
            .collect();
        detached.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(detached.iter().map(Module::to_ref).collect())
    }

    // --- Endpoints ---

    /// Create an endpoint and append it to its module's endpoint list.
    ///
    /// The endpoint record is written first; if the owning module is missing or
    /// cannot be updated, the endpoint write is rolled back.
    pub fn create_endpoint(&self, data: NewEndpoint) -> Result<EntityId, CatalogError> {
        let name = validate_name(&data.name)?;
        let endpoint = Endpoint::new(data.module_id, name, data.declaration, data.description);
        self.backend.save_endpoint(&endpoint)?;

        let attached = match self.backend.load_module(&data.module_id) {
            Ok(Some(mut module)) => {
                module.endpoints.push(endpoint.to_ref());
                module.touch();
                self.backend.save_module(&module).map_err(CatalogError::from)
            }
            Ok(None) => Err(CatalogError::module_not_found(data.module_id)),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = attached {
            warn!(
                endpoint_id = %endpoint.id,
                module_id = %data.module_id,
                error = %e,
                "Rolling back endpoint write"
            );
            if let Err(rollback) = self.backend.remove_endpoint(&endpoint.id) {
                warn!(
                    endpoint_id = %endpoint.id,
                    error = %rollback,
                    "Endpoint rollback failed; record left orphaned"
                );
            }
            return Err(e);
        }

        debug!(endpoint_id = %endpoint.id, module_id = %data.module_id, "Created endpoint");
        Ok(endpoint.id)
    }

    pub fn get_endpoint(&self, id: &EntityId) -> Result<Option<Endpoint>, CatalogError> {
        Ok(self.backend.load_endpoint(id)?)
    }

    /// Patch an endpoint. A rename is mirrored into the owning module's endpoint list.
    pub fn update_endpoint(
        &self,
        id: &EntityId,
        patch: EndpointPatch,
    ) -> Result<Endpoint, CatalogError> {
        let mut endpoint = self
            .backend
            .load_endpoint(id)?
            .ok_or_else(|| CatalogError::endpoint_not_found(*id))?;

        let renamed_to = match patch.name {
            Some(ref name) => {
                let name = validate_name(name)?;
                (name != endpoint.name).then_some(name)
            }
            None => None,
        };
        if let Some(ref name) = renamed_to {
            endpoint.name = name.clone();
        }
        if let Some(declaration) = patch.declaration {
            endpoint.declaration = declaration;
        }
        if let Some(description) = patch.description {
            endpoint.description = description;
        }
        endpoint.touch();
        self.backend.save_endpoint(&endpoint)?;

        if let Some(name) = renamed_to {
            if let Some(mut module) = self.backend.load_module(&endpoint.module_id)? {
                if let Some(entry) = module.endpoints.iter_mut().find(|e| e.id == endpoint.id) {
                    entry.name = name;
                    module.updated_at = endpoint.updated_at;
                    self.backend.save_module(&module)?;
                }
            }
        }

        debug!(endpoint_id = %id, "Updated endpoint");
        Ok(endpoint)
    }

    /// List a module's endpoints in stored order, filtered by name.
    pub fn list_endpoints(
        &self,
        module_id: &EntityId,
        filter: &NameFilter,
    ) -> Result<Vec<EndpointRef>, CatalogError> {
        let module = self.require_module(module_id)?;
        Ok(module
            .endpoints
            .into_iter()
            .filter(|e| filter.matches(&e.name))
            .collect())
    }

    // --- Shared helpers ---

    /// Load a module that must exist.
    pub(crate) fn require_module(&self, id: &EntityId) -> Result<Module, CatalogError> {
        self.backend
            .load_module(id)?
            .ok_or_else(|| CatalogError::module_not_found(*id))
    }

    /// Persist a module record as-is. Used by the tree mutator.
    pub(crate) fn save_module(&self, module: &Module) -> Result<(), CatalogError> {
        Ok(self.backend.save_module(module)?)
    }

    pub fn flush(&self) -> Result<(), CatalogError> {
        Ok(self.backend.flush()?)
    }
}
