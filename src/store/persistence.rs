//! Sled-backed record persistence

use crate::error::StorageError;
use crate::model::{Endpoint, Module};
use crate::store::backend::RecordBackend;
use crate::types::{EntityId, ModuleRef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use std::io;
use std::path::Path;

const TREE_MODULES: &str = "modules";
const TREE_ENDPOINTS: &str = "endpoints";
const TREE_META: &str = "meta";
const KEY_ROOT_INDEX: &[u8] = b"root_index";

/// Sled-based implementation of [`RecordBackend`].
///
/// Records are stored as JSON values keyed by the raw id bytes, one sled tree
/// per record kind. The root index is a single JSON array in the `meta` tree.
#[derive(Clone)]
pub struct SledBackend {
    db: Db,
    modules: Tree,
    endpoints: Tree,
    meta: Tree,
}

impl SledBackend {
    /// Open (or create) a sled database at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let modules = db.open_tree(TREE_MODULES).map_err(to_storage_io)?;
        let endpoints = db.open_tree(TREE_ENDPOINTS).map_err(to_storage_io)?;
        let meta = db.open_tree(TREE_META).map_err(to_storage_io)?;
        Ok(Self {
            db,
            modules,
            endpoints,
            meta,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &Db {
        &self.db
    }
}

impl RecordBackend for SledBackend {
    fn load_module(&self, id: &EntityId) -> Result<Option<Module>, StorageError> {
        load_json(&self.modules, id.as_bytes())
    }

    fn save_module(&self, module: &Module) -> Result<(), StorageError> {
        save_json(&self.modules, module.id.as_bytes(), module)
    }

    fn scan_modules(&self) -> Result<Vec<Module>, StorageError> {
        let mut out = Vec::new();
        for item in self.modules.iter() {
            let (key, value) = item.map_err(to_storage_io)?;
            out.push(decode(&key, &value)?);
        }
        Ok(out)
    }

    fn load_endpoint(&self, id: &EntityId) -> Result<Option<Endpoint>, StorageError> {
        load_json(&self.endpoints, id.as_bytes())
    }

    fn save_endpoint(&self, endpoint: &Endpoint) -> Result<(), StorageError> {
        save_json(&self.endpoints, endpoint.id.as_bytes(), endpoint)
    }

    fn remove_endpoint(&self, id: &EntityId) -> Result<(), StorageError> {
        self.endpoints.remove(id.as_bytes()).map_err(to_storage_io)?;
        Ok(())
    }

    fn load_root_index(&self) -> Result<Vec<ModuleRef>, StorageError> {
        Ok(load_json(&self.meta, KEY_ROOT_INDEX)?.unwrap_or_default())
    }

    fn save_root_index(&self, roots: &[ModuleRef]) -> Result<(), StorageError> {
        save_json(&self.meta, KEY_ROOT_INDEX, roots)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_io)?;
        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(tree: &Tree, key: &[u8]) -> Result<Option<T>, StorageError> {
    let Some(raw) = tree.get(key).map_err(to_storage_io)? else {
        return Ok(None);
    };
    Ok(Some(decode(key, &raw)?))
}

fn save_json<T: Serialize + ?Sized>(tree: &Tree, key: &[u8], value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(to_storage_data)?;
    tree.insert(key, bytes).map_err(to_storage_io)?;
    Ok(())
}

fn decode<T: DeserializeOwned>(key: &[u8], raw: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(raw).map_err(|e| StorageError::CorruptRecord {
        key: describe_key(key),
        message: e.to_string(),
    })
}

fn describe_key(key: &[u8]) -> String {
    match uuid::Uuid::from_slice(key) {
        Ok(uuid) => uuid.to_string(),
        Err(_) => String::from_utf8_lossy(key).into_owned(),
    }
}

fn to_storage_io(err: sled::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

fn to_storage_data(err: serde_json::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
}
