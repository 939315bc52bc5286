//! In-flight registry: at most one active sync per entity id

use crate::error::CatalogError;
use crate::types::EntityId;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::warn;

/// Set of entity ids with a sync currently in progress.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    ids: Mutex<HashSet<EntityId>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as in flight, or fail with `Busy` if it already is.
    ///
    /// The marker is held by the returned guard and cleared when the guard is
    /// dropped, whether the sync finished, failed, or its future was dropped.
    pub fn try_acquire(&self, id: EntityId) -> Result<InFlightGuard<'_>, CatalogError> {
        if !self.ids.lock().insert(id) {
            warn!(entity_id = %id, "Sync rejected: already in flight");
            return Err(CatalogError::Busy(id));
        }
        Ok(InFlightGuard { registry: self, id })
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

/// Holds one id's in-flight marker.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    id: EntityId,
}

impl InFlightGuard<'_> {
    pub fn id(&self) -> EntityId {
        self.id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.ids.lock().remove(&self.id);
    }
}
