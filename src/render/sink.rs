//! Document sinks: where rendered text ends up

use crate::error::{CatalogError, StorageError};
use parking_lot::Mutex;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Stores rendered documents at docs-root-relative locations.
pub trait DocumentSink: Send + Sync {
    /// Write (or overwrite) the document at `location`.
    fn write(&self, location: &str, text: &str) -> Result<(), CatalogError>;
}

/// Filesystem sink rooted at a docs directory.
pub struct FsDocumentSink {
    root: PathBuf,
}

impl FsDocumentSink {
    /// Create a sink at the given docs root, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create docs directory at {:?}: {}", root, e),
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a docs-root-relative location.
    ///
    /// Every segment must be a plain file or directory name, so the result
    /// always stays under the docs root.
    pub fn path_for(&self, location: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for part in location.split('/').filter(|s| !s.is_empty()) {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) if name.to_str() == Some(part) => {
                    path.push(part)
                }
                _ => {
                    return Err(StorageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Document location {:?} escapes the docs root", location),
                    )))
                }
            }
        }
        Ok(path)
    }
}

impl DocumentSink for FsDocumentSink {
    /// Writes to a temporary sibling, then renames over the target.
    fn write(&self, location: &str, text: &str) -> Result<(), CatalogError> {
        let doc_path = self.path_for(location)?;
        let temp_path = doc_path.with_extension("md.tmp");

        if let Some(parent) = doc_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create parent directory {:?}: {}", parent, e),
                ))
            })?;
        }

        fs::write(&temp_path, text).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to write document to {:?}: {}", temp_path, e),
            ))
        })?;

        fs::rename(&temp_path, &doc_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file to {:?}: {}", doc_path, e),
            ))
        })?;

        Ok(())
    }
}

/// A document captured by [`MemoryDocumentSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub location: String,
    pub text: String,
}

/// In-memory sink that records every write in order.
#[derive(Default)]
pub struct MemoryDocumentSink {
    written: Mutex<Vec<WrittenDocument>>,
}

impl MemoryDocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, in write order.
    pub fn written(&self) -> Vec<WrittenDocument> {
        self.written.lock().clone()
    }

    /// Locations written so far, in write order.
    pub fn locations(&self) -> Vec<String> {
        self.written
            .lock()
            .iter()
            .map(|d| d.location.clone())
            .collect()
    }

    /// Latest text written at `location`.
    pub fn get(&self, location: &str) -> Option<String> {
        self.written
            .lock()
            .iter()
            .rev()
            .find(|d| d.location == location)
            .map(|d| d.text.clone())
    }

    pub fn clear(&self) {
        self.written.lock().clear();
    }
}

impl DocumentSink for MemoryDocumentSink {
    fn write(&self, location: &str, text: &str) -> Result<(), CatalogError> {
        self.written.lock().push(WrittenDocument {
            location: location.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}
