//! Raw record persistence interface.

use crate::error::StorageError;
use crate::model::{Endpoint, Module};
use crate::types::{EntityId, ModuleRef};

/// Key-addressed persistence for catalog records.
///
/// Backends only load and save whole records; referential bookkeeping lives in
/// [`EntityStore`](super::EntityStore) and the tree mutator. There is no
/// record-level locking: two writers of the same key race, last write wins.
pub trait RecordBackend {
    fn load_module(&self, id: &EntityId) -> Result<Option<Module>, StorageError>;

    fn save_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Every stored module record, in no particular order.
    fn scan_modules(&self) -> Result<Vec<Module>, StorageError>;

    fn load_endpoint(&self, id: &EntityId) -> Result<Option<Endpoint>, StorageError>;

    fn save_endpoint(&self, endpoint: &Endpoint) -> Result<(), StorageError>;

    /// Remove an endpoint record. Only used to roll back a failed create.
    fn remove_endpoint(&self, id: &EntityId) -> Result<(), StorageError>;

    /// Load the root index. A missing index reads as empty.
    fn load_root_index(&self) -> Result<Vec<ModuleRef>, StorageError>;

    fn save_root_index(&self, roots: &[ModuleRef]) -> Result<(), StorageError>;

    /// Flush pending writes to durable storage.
    fn flush(&self) -> Result<(), StorageError>;
}
