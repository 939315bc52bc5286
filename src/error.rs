//! Error types for the docsync catalog.

use crate::types::{EntityId, EntityKind};
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt record under key {key}: {message}")]
    CorruptRecord { key: String, message: String },

    #[error("Simulated write failure")]
    SimulatedFailure,
}

/// Errors surfaced by the catalog, tree, and sync operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required id does not resolve to an existing record.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The addressed parent/child edge does not exist, or the edit would break the tree.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A sync call targets an id already in flight. Retryable.
    #[error("Sync already in progress for {0}")]
    Busy(EntityId),

    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Parent chain of {0} contains a cycle")]
    CycleDetected(EntityId),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl CatalogError {
    pub fn module_not_found(id: EntityId) -> Self {
        CatalogError::NotFound {
            kind: EntityKind::Module,
            id,
        }
    }

    pub fn endpoint_not_found(id: EntityId) -> Self {
        CatalogError::NotFound {
            kind: EntityKind::Endpoint,
            id,
        }
    }

    /// Whether the caller may reasonably retry the same call later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Busy(_))
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::ConfigError(err.to_string())
    }
}
