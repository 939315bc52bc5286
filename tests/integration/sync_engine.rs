//! Integration tests for document synchronization

use async_trait::async_trait;
use docsync::error::CatalogError;
use docsync::model::{Endpoint, Module, NewEndpoint, NewModule};
use docsync::render::{
    DocumentRenderer, FsDocumentSink, MarkdownRenderer, MemoryDocumentSink,
};
use docsync::store::EntityStore;
use docsync::sync::SyncEngine;
use docsync::tree::ModulePath;
use docsync::types::{EntityId, ModuleRef};
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Which render call a [`GatedRenderer`] parks on.
#[derive(Clone, Copy, PartialEq)]
enum Gated {
    Modules,
    Endpoints,
}

/// Renderer that parks on every gated render until released.
struct GatedRenderer {
    inner: MarkdownRenderer,
    gated: Gated,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedRenderer {
    fn new(gated: Gated) -> (Self, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let renderer = Self {
            inner: MarkdownRenderer::new(),
            gated,
            started: started.clone(),
            release: release.clone(),
        };
        (renderer, started, release)
    }

    async fn park(&self, kind: Gated) {
        if self.gated == kind {
            self.started.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl DocumentRenderer for GatedRenderer {
    async fn render_module(
        &self,
        module: &Module,
        path: &ModulePath,
    ) -> Result<String, CatalogError> {
        self.park(Gated::Modules).await;
        Ok(self.inner.module_markdown(module, path))
    }

    async fn render_endpoint(
        &self,
        endpoint: &Endpoint,
        module: &Module,
        module_path: &ModulePath,
    ) -> Result<String, CatalogError> {
        self.park(Gated::Endpoints).await;
        Ok(self.inner.endpoint_markdown(endpoint, module, module_path))
    }

    async fn render_index(&self, roots: &[ModuleRef]) -> Result<String, CatalogError> {
        Ok(self.inner.index_markdown(roots))
    }
}

/// Renderer that fails on anything named "broken".
struct FailingRenderer {
    inner: MarkdownRenderer,
}

#[async_trait]
impl DocumentRenderer for FailingRenderer {
    async fn render_module(
        &self,
        module: &Module,
        path: &ModulePath,
    ) -> Result<String, CatalogError> {
        if module.name == "broken" {
            return Err(CatalogError::RenderFailed(module.name.clone()));
        }
        Ok(self.inner.module_markdown(module, path))
    }

    async fn render_endpoint(
        &self,
        endpoint: &Endpoint,
        module: &Module,
        module_path: &ModulePath,
    ) -> Result<String, CatalogError> {
        if endpoint.name == "broken" {
            return Err(CatalogError::RenderFailed(endpoint.name.clone()));
        }
        Ok(self.inner.endpoint_markdown(endpoint, module, module_path))
    }

    async fn render_index(&self, roots: &[ModuleRef]) -> Result<String, CatalogError> {
        Ok(self.inner.index_markdown(roots))
    }
}

fn add_endpoint(store: &EntityStore, module_id: EntityId, name: &str) -> EntityId {
    store
        .create_endpoint(NewEndpoint {
            module_id,
            name: name.to_string(),
            declaration: format!("fn {}()", name),
            description: String::new(),
        })
        .unwrap()
}

fn sub(store: &EntityStore, parent: EntityId, name: &str) -> EntityId {
    store
        .mutator()
        .create_sub_module(&parent, NewModule::new(name, ""))
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_sync_of_same_endpoint_is_busy() {
    let store = EntityStore::in_memory();
    let module_id = store.create_module(NewModule::new("users", "")).unwrap();
    let endpoint_id = add_endpoint(&store, module_id, "get");
    let (renderer, started, release) = GatedRenderer::new(Gated::Endpoints);
    let sink = Arc::new(MemoryDocumentSink::new());
    let engine = Arc::new(SyncEngine::new(store, Arc::new(renderer), sink.clone()));

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync_endpoint(endpoint_id).await }
    });
    started.notified().await;
    assert!(engine.in_flight().contains(&endpoint_id));

    let err = engine.sync_endpoint(endpoint_id).await.unwrap_err();
    assert!(matches!(err, CatalogError::Busy(busy_id) if busy_id == endpoint_id));

    // The owning module's sync reaches the same endpoint and gives up there.
    let err = engine.sync_module(module_id).await.unwrap_err();
    assert!(matches!(err, CatalogError::Busy(busy_id) if busy_id == endpoint_id));
    assert!(!engine.in_flight().contains(&module_id));

    release.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.endpoints, 1);
    assert!(engine.in_flight().is_empty());
    assert!(sink.get("apis/users/get.md").is_some());
}

#[tokio::test]
async fn test_concurrent_sync_of_same_module_is_busy() {
    let store = EntityStore::in_memory();
    let id = store.create_module(NewModule::new("slow", "")).unwrap();
    let (renderer, started, release) = GatedRenderer::new(Gated::Modules);
    let engine = Arc::new(SyncEngine::new(
        store,
        Arc::new(renderer),
        Arc::new(MemoryDocumentSink::new()),
    ));

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync_module(id).await }
    });
    started.notified().await;
    assert!(engine.in_flight().contains(&id));

    let err = engine.sync_module(id).await.unwrap_err();
    assert!(matches!(err, CatalogError::Busy(busy_id) if busy_id == id));
    assert!(err.is_retryable());

    release.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.modules, 1);
    assert!(engine.in_flight().is_empty());

    // Retrying after the first call finished succeeds.
    release.notify_one();
    assert!(engine.sync_module(id).await.is_ok());
}

#[tokio::test]
async fn test_cancelled_sync_clears_in_flight_marker() {
    let store = EntityStore::in_memory();
    let id = store.create_module(NewModule::new("stuck", "")).unwrap();
    let (renderer, started, _release) = GatedRenderer::new(Gated::Modules);
    let engine = Arc::new(SyncEngine::new(
        store,
        Arc::new(renderer),
        Arc::new(MemoryDocumentSink::new()),
    ));

    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync_module(id).await }
    });
    started.notified().await;
    assert!(engine.in_flight().contains(&id));

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(engine.in_flight().is_empty());
}

#[tokio::test]
async fn test_subtree_sync_writes_only_subtree_documents() {
    let store = EntityStore::in_memory();
    let root = store.create_module(NewModule::new("root", "")).unwrap();
    let mid = sub(&store, root, "mid");
    let leaf = sub(&store, mid, "leaf");
    add_endpoint(&store, root, "r1");
    add_endpoint(&store, mid, "m1");
    add_endpoint(&store, leaf, "l1");
    add_endpoint(&store, leaf, "l2");

    let other = store.create_module(NewModule::new("other", "")).unwrap();
    add_endpoint(&store, other, "o1");
    sub(&store, other, "sibling");

    let sink = Arc::new(MemoryDocumentSink::new());
    let engine = SyncEngine::new(store, Arc::new(MarkdownRenderer::new()), sink.clone());
    let report = engine.sync_module(root).await.unwrap();

    let expected: BTreeSet<String> = [
        "modules/root.md",
        "apis/root/r1.md",
        "modules/root/mid.md",
        "apis/root/mid/m1.md",
        "modules/root/mid/leaf.md",
        "apis/root/mid/leaf/l1.md",
        "apis/root/mid/leaf/l2.md",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let written: BTreeSet<String> = sink.locations().into_iter().collect();
    assert_eq!(written, expected);
    assert_eq!(report.modules, 3);
    assert_eq!(report.endpoints, 4);
    assert_eq!(report.documents.len(), 7);
}

#[tokio::test]
async fn test_render_failure_aborts_remaining_steps() {
    let store = EntityStore::in_memory();
    let root = store.create_module(NewModule::new("root", "")).unwrap();
    add_endpoint(&store, root, "broken");
    add_endpoint(&store, root, "after");
    sub(&store, root, "child");

    let sink = Arc::new(MemoryDocumentSink::new());
    let engine = SyncEngine::new(
        store,
        Arc::new(FailingRenderer {
            inner: MarkdownRenderer::new(),
        }),
        sink.clone(),
    );

    let err = engine.sync_module(root).await.unwrap_err();
    assert!(matches!(err, CatalogError::RenderFailed(_)));
    assert_eq!(sink.locations(), vec!["modules/root.md"]);
    assert!(engine.in_flight().is_empty());
}

#[tokio::test]
async fn test_sync_all_stops_at_first_failing_root() {
    let store = EntityStore::in_memory();
    store.create_module(NewModule::new("first", "")).unwrap();
    store.create_module(NewModule::new("broken", "")).unwrap();
    store.create_module(NewModule::new("last", "")).unwrap();

    let sink = Arc::new(MemoryDocumentSink::new());
    let engine = SyncEngine::new(
        store,
        Arc::new(FailingRenderer {
            inner: MarkdownRenderer::new(),
        }),
        sink.clone(),
    );

    assert!(engine.sync_all().await.is_err());
    assert_eq!(sink.locations(), vec!["modules/first.md"]);
}

#[tokio::test]
async fn test_sync_endpoint_alone() {
    let store = EntityStore::in_memory();
    let root = store.create_module(NewModule::new("billing", "")).unwrap();
    let invoices = sub(&store, root, "invoices");
    let ep = add_endpoint(&store, invoices, "create");

    let sink = Arc::new(MemoryDocumentSink::new());
    let engine = SyncEngine::new(store, Arc::new(MarkdownRenderer::new()), sink.clone());
    let report = engine.sync_endpoint(ep).await.unwrap();

    assert_eq!(report.endpoints, 1);
    assert_eq!(report.modules, 0);
    let text = sink.get("apis/billing/invoices/create.md").unwrap();
    assert!(text.contains("(../../../modules/billing/invoices.md)"));

    let err = engine.sync_endpoint(EntityId::new()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_fs_sink_mirrors_tree_depth() {
    let temp_dir = TempDir::new().unwrap();
    let store = EntityStore::in_memory();
    let root = store.create_module(NewModule::new("billing", "")).unwrap();
    let invoices = sub(&store, root, "invoices");
    add_endpoint(&store, invoices, "create");

    let sink = FsDocumentSink::new(temp_dir.path()).unwrap();
    let engine = SyncEngine::new(store, Arc::new(MarkdownRenderer::new()), Arc::new(sink));
    engine.sync_all().await.unwrap();

    let docs = temp_dir.path();
    let module_doc =
        std::fs::read_to_string(docs.join("modules").join("billing").join("invoices.md")).unwrap();
    assert!(module_doc.contains("[create](../../apis/billing/invoices/create.md)"));

    // Every relative link in the module document points at a written file.
    let base = docs.join("modules").join("billing");
    assert!(base
        .join("../../apis/billing/invoices/create.md")
        .exists());
    assert!(docs.join("index.md").exists());
    assert!(docs
        .join("apis")
        .join("billing")
        .join("invoices")
        .join("create.md")
        .exists());
}
