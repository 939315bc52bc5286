//! In-memory record backend

use crate::error::StorageError;
use crate::model::{Endpoint, Module};
use crate::store::backend::RecordBackend;
use crate::types::{EntityId, ModuleRef};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory [`RecordBackend`] for tests and previews.
///
/// Write failures can be injected to exercise rollback and the degraded states
/// left behind by interrupted two-phase tree edits.
#[derive(Default)]
pub struct MemBackend {
    modules: Mutex<HashMap<EntityId, Module>>,
    endpoints: Mutex<HashMap<EntityId, Endpoint>>,
    roots: Mutex<Vec<ModuleRef>>,
    /// Remaining writes before every further write fails. `None` disables injection.
    writes_until_failure: Mutex<Option<usize>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail (or succeed again) from now on.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.writes_until_failure.lock() = if simulate { Some(0) } else { None };
    }

    /// Allow `writes` more successful writes, then fail every write after them.
    pub fn fail_after_writes(&self, writes: usize) {
        *self.writes_until_failure.lock() = Some(writes);
    }

    pub fn module_count(&self) -> usize {
        self.modules.lock().len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.lock().len()
    }

    fn check_write(&self) -> Result<(), StorageError> {
        let mut remaining = self.writes_until_failure.lock();
        match remaining.as_mut() {
            None => Ok(()),
            Some(0) => Err(StorageError::SimulatedFailure),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }
}

impl RecordBackend for MemBackend {
    fn load_module(&self, id: &EntityId) -> Result<Option<Module>, StorageError> {
        Ok(self.modules.lock().get(id).cloned())
    }

    fn save_module(&self, module: &Module) -> Result<(), StorageError> {
        self.check_write()?;
        self.modules.lock().insert(module.id, module.clone());
        Ok(())
    }

    fn scan_modules(&self) -> Result<Vec<Module>, StorageError> {
        Ok(self.modules.lock().values().cloned().collect())
    }

    fn load_endpoint(&self, id: &EntityId) -> Result<Option<Endpoint>, StorageError> {
        Ok(self.endpoints.lock().get(id).cloned())
    }

    fn save_endpoint(&self, endpoint: &Endpoint) -> Result<(), StorageError> {
        self.check_write()?;
        self.endpoints.lock().insert(endpoint.id, endpoint.clone());
        Ok(())
    }

    fn remove_endpoint(&self, id: &EntityId) -> Result<(), StorageError> {
        self.endpoints.lock().remove(id);
        Ok(())
    }

    fn load_root_index(&self) -> Result<Vec<ModuleRef>, StorageError> {
        Ok(self.roots.lock().clone())
    }

    fn save_root_index(&self, roots: &[ModuleRef]) -> Result<(), StorageError> {
        self.check_write()?;
        *self.roots.lock() = roots.to_vec();
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
