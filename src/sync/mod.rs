//! Document Synchronization
//!
//! Regenerates derived documents from the current state of the entity store.
//! Syncing a module regenerates, in order: the module's own document, each
//! owned endpoint's document in stored order, then each child module
//! recursively in stored order (depth-first, pre-order).
//!
//! At most one sync per entity id runs at a time. A call targeting an id that
//! is already in flight fails immediately with `Busy`; the marker is cleared on
//! every exit path. Any failure aborts the remaining steps of that call and
//! propagates to the caller; there is no retry.

pub mod in_flight;

pub use in_flight::{InFlightGuard, InFlightRegistry};

use crate::error::CatalogError;
use crate::model::NameFilter;
use crate::render::layout::{endpoint_doc, module_doc, INDEX_DOC};
use crate::render::{DocumentRenderer, DocumentSink};
use crate::store::EntityStore;
use crate::types::{EntityId, ModuleRef};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of one sync call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Module documents written
    pub modules: usize,
    /// Endpoint documents written
    pub endpoints: usize,
    /// Whether the top-level index was rewritten
    pub index: bool,
    /// Locations written, in write order
    pub documents: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Drives document regeneration for modules and endpoints.
pub struct SyncEngine {
    store: EntityStore,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn DocumentSink>,
    in_flight: InFlightRegistry,
}

impl SyncEngine {
    pub fn new(
        store: EntityStore,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            store,
            renderer,
            sink,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Ids currently being synced by this engine.
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Regenerate a module's document, its endpoints' documents, and its whole
    /// subtree.
    pub async fn sync_module(&self, id: EntityId) -> Result<SyncReport, CatalogError> {
        let start = Instant::now();
        let mut report = SyncReport::default();
        info!(module_id = %id, "Module sync started");

        let result = self.sync_module_into(id, &mut report).await;
        report.duration_ms = start.elapsed().as_millis() as u64;
        self.finish("Module", id, result, report)
    }

    /// Regenerate a single endpoint's document.
    pub async fn sync_endpoint(&self, id: EntityId) -> Result<SyncReport, CatalogError> {
        let start = Instant::now();
        let mut report = SyncReport::default();
        info!(endpoint_id = %id, "Endpoint sync started");

        let result = self.sync_endpoint_into(id, &mut report).await;
        report.duration_ms = start.elapsed().as_millis() as u64;
        self.finish("Endpoint", id, result, report)
    }

    /// Sync every root-index module in index order, then rewrite the index.
    ///
    /// Index entries whose module has since been moved under a parent are
    /// skipped; their parent's subtree covers them. A failure on one root
    /// aborts the whole call; later roots are not attempted.
    pub async fn sync_all(&self) -> Result<SyncReport, CatalogError> {
        let start = Instant::now();
        let mut report = SyncReport::default();
        let roots = self.store.list_modules(&NameFilter::default())?;
        info!(roots = roots.len(), "Full sync started");

        let listed = self.still_parentless(roots)?;
        for root in &listed {
            if let Err(e) = self.sync_module_into(root.id, &mut report).await {
                warn!(module_id = %root.id, error = %e, "Full sync aborted");
                return Err(e);
            }
        }

        self.write_index(listed, &mut report).await?;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            modules = report.modules,
            endpoints = report.endpoints,
            duration_ms = report.duration_ms,
            "Full sync finished"
        );
        Ok(report)
    }

    /// Rewrite only the top-level index from the current root index.
    pub async fn sync_index(&self) -> Result<SyncReport, CatalogError> {
        let start = Instant::now();
        let mut report = SyncReport::default();
        let roots = self.store.list_modules(&NameFilter::default())?;
        let listed = self.still_parentless(roots)?;
        self.write_index(listed, &mut report).await?;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(roots = report.documents.len(), "Index sync finished");
        Ok(report)
    }

    async fn write_index(
        &self,
        listed: Vec<ModuleRef>,
        report: &mut SyncReport,
    ) -> Result<(), CatalogError> {
        let text = self.renderer.render_index(&listed).await?;
        self.write(INDEX_DOC, &text, report)?;
        report.index = true;
        Ok(())
    }

    fn sync_module_into<'a>(
        &'a self,
        id: EntityId,
        report: &'a mut SyncReport,
    ) -> BoxFuture<'a, Result<(), CatalogError>> {
        async move {
            let _guard = self.in_flight.try_acquire(id)?;

            let module = self
                .store
                .get_module(&id)?
                .ok_or_else(|| CatalogError::module_not_found(id))?;
            let path = self
                .store
                .resolver()
                .path_of(&id)?
                .ok_or_else(|| CatalogError::module_not_found(id))?;

            let text = self.renderer.render_module(&module, &path).await?;
            self.write(&module_doc(&path), &text, report)?;
            report.modules += 1;

            for endpoint in &module.endpoints {
                self.sync_endpoint_into(endpoint.id, report).await?;
            }
            for child in &module.children {
                self.sync_module_into(child.id, report).await?;
            }
            Ok(())
        }
        .boxed()
    }

    async fn sync_endpoint_into(
        &self,
        id: EntityId,
        report: &mut SyncReport,
    ) -> Result<(), CatalogError> {
        let _guard = self.in_flight.try_acquire(id)?;

        let endpoint = self
            .store
            .get_endpoint(&id)?
            .ok_or_else(|| CatalogError::endpoint_not_found(id))?;
        let module = self
            .store
            .get_module(&endpoint.module_id)?
            .ok_or_else(|| CatalogError::module_not_found(endpoint.module_id))?;
        let module_path = self
            .store
            .resolver()
            .path_of(&module.id)?
            .ok_or_else(|| CatalogError::module_not_found(module.id))?;

        let text = self
            .renderer
            .render_endpoint(&endpoint, &module, &module_path)
            .await?;
        self.write(&endpoint_doc(&module_path, &endpoint.name), &text, report)?;
        report.endpoints += 1;
        Ok(())
    }

    fn write(
        &self,
        location: &str,
        text: &str,
        report: &mut SyncReport,
    ) -> Result<(), CatalogError> {
        self.sink.write(location, text)?;
        debug!(location = %location, bytes = text.len(), "Document written");
        report.documents.push(location.to_string());
        Ok(())
    }

    /// Root-index entries whose module still exists and has no parent.
    fn still_parentless(&self, roots: Vec<ModuleRef>) -> Result<Vec<ModuleRef>, CatalogError> {
        let mut out = Vec::with_capacity(roots.len());
        for root in roots {
            if let Some(module) = self.store.get_module(&root.id)? {
                if module.is_root() {
                    out.push(root);
                }
            }
        }
        Ok(out)
    }

    fn finish(
        &self,
        kind: &str,
        id: EntityId,
        result: Result<(), CatalogError>,
        report: SyncReport,
    ) -> Result<SyncReport, CatalogError> {
        match result {
            Ok(()) => {
                info!(
                    entity_id = %id,
                    modules = report.modules,
                    endpoints = report.endpoints,
                    duration_ms = report.duration_ms,
                    "{} sync finished",
                    kind
                );
                Ok(report)
            }
            Err(e) => {
                warn!(entity_id = %id, error = %e, "{} sync failed", kind);
                Err(e)
            }
        }
    }
}
