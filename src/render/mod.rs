//! Document Rendering
//!
//! The sync engine turns catalog records into documents through two seams:
//! a [`DocumentRenderer`] produces text for one record, and a
//! [`DocumentSink`] stores that text at a docs-root-relative location chosen by
//! [`layout`].

pub mod layout;
pub mod markdown;
pub mod sink;

pub use markdown::MarkdownRenderer;
pub use sink::{DocumentSink, FsDocumentSink, MemoryDocumentSink, WrittenDocument};

use crate::error::CatalogError;
use crate::model::{Endpoint, Module};
use crate::tree::ModulePath;
use crate::types::ModuleRef;
use async_trait::async_trait;

/// Turns one record into document text.
///
/// Rendering may suspend (e.g. a renderer backed by a remote service); the sync
/// engine awaits it while holding the entity's in-flight marker.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Render a module document located at [`layout::module_doc`] for `path`.
    ///
    /// Must link each owned endpoint and each child module relative to that
    /// location.
    async fn render_module(&self, module: &Module, path: &ModulePath)
        -> Result<String, CatalogError>;

    /// Render an endpoint document located at [`layout::endpoint_doc`] under the
    /// owning module's path, linking back to the module document.
    async fn render_endpoint(
        &self,
        endpoint: &Endpoint,
        module: &Module,
        module_path: &ModulePath,
    ) -> Result<String, CatalogError>;

    /// Render the top-level listing of root modules.
    async fn render_index(&self, roots: &[ModuleRef]) -> Result<String, CatalogError>;
}
