//! CLI route: single route table and run context. Dispatches to the store,
//! tree mutator, and sync engine.

use crate::cli::help::{command_name, is_mutating};
use crate::cli::output::to_json;
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, DocsyncConfig};
use crate::error::CatalogError;
use crate::model::{EndpointPatch, Module, ModulePatch, NameFilter, NewEndpoint, NewModule};
use crate::render::{DocumentSink, FsDocumentSink, MarkdownRenderer};
use crate::store::{EntityStore, SledBackend};
use crate::sync::{SyncEngine, SyncReport};
use crate::types::EntityId;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Module record plus its current path, as printed by the CLI.
#[derive(Debug, Serialize)]
struct ModuleView {
    #[serde(flatten)]
    module: Module,
    path: Option<String>,
}

/// Runtime context for CLI execution: effective config and the sync engine.
pub struct RunContext {
    config: DocsyncConfig,
    engine: Arc<SyncEngine>,
}

impl RunContext {
    /// Load config (explicit file, or layered from the workspace), then open
    /// the sled store and the docs directory it names.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, CatalogError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };

        let backend = SledBackend::new(&config.data_dir)?;
        let sink = FsDocumentSink::new(&config.docs_dir)?;
        info!(
            data_dir = %config.data_dir.display(),
            docs_dir = %config.docs_dir.display(),
            "Run context opened"
        );

        Ok(Self::with_parts(
            config,
            EntityStore::new(Arc::new(backend)),
            Arc::new(sink),
        ))
    }

    /// Assemble a context from already-open parts.
    pub fn with_parts(
        config: DocsyncConfig,
        store: EntityStore,
        sink: Arc<dyn DocumentSink>,
    ) -> Self {
        let engine = SyncEngine::new(store, Arc::new(MarkdownRenderer::new()), sink);
        Self {
            config,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    fn store(&self) -> &EntityStore {
        self.engine.store()
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, CatalogError> {
        let started = Instant::now();
        let result = self.execute_inner(command).await;
        if result.is_ok() && is_mutating(command) {
            self.store().flush()?;
        }
        debug!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, CatalogError> {
        match command {
            Commands::AddModule {
                name,
                description,
                parent,
            } => self.handle_add_module(name, description, parent.as_deref()).await,
            Commands::AddEndpoint {
                module,
                name,
                declaration,
                description,
            } => {
                self.handle_add_endpoint(module, name, declaration, description)
                    .await
            }
            Commands::UpdateModule {
                module,
                name,
                description,
            } => {
                let patch = ModulePatch {
                    name: name.clone(),
                    description: description.clone(),
                };
                self.handle_update_module(module, patch).await
            }
            Commands::UpdateEndpoint {
                id,
                name,
                declaration,
                description,
            } => {
                let patch = EndpointPatch {
                    name: name.clone(),
                    declaration: declaration.clone(),
                    description: description.clone(),
                };
                self.handle_update_endpoint(id, patch).await
            }
            Commands::ListModules { filter, detached } => {
                self.handle_list_modules(filter.as_deref(), *detached)
            }
            Commands::ListEndpoints { module, filter } => {
                let module_id = self.resolve_module(module)?;
                let filter = name_filter(filter.as_deref());
                to_json(&self.store().list_endpoints(&module_id, &filter)?)
            }
            Commands::ShowModule { id, path } => self.handle_show_module(id.as_ref(), path.as_deref()),
            Commands::ShowEndpoint { id } => {
                let endpoint = self
                    .store()
                    .get_endpoint(id)?
                    .ok_or_else(|| CatalogError::endpoint_not_found(*id))?;
                to_json(&endpoint)
            }
            Commands::MoveModule { module, to } => self.handle_move_module(module, to).await,
            Commands::DetachModule { parent, child } => {
                self.handle_detach_module(parent, child).await
            }
            Commands::Sync { module, endpoint } => {
                let report = match (module, endpoint) {
                    (Some(module), _) => {
                        let id = self.resolve_module(module)?;
                        self.engine.sync_module(id).await?
                    }
                    (None, Some(endpoint)) => self.engine.sync_endpoint(*endpoint).await?,
                    (None, None) => self.engine.sync_all().await?,
                };
                to_json(&report)
            }
            Commands::Config => self.config.to_toml(),
        }
    }

    async fn handle_add_module(
        &self,
        name: &str,
        description: &str,
        parent: Option<&str>,
    ) -> Result<String, CatalogError> {
        let data = NewModule::new(name, description);
        let (id, sync) = match parent {
            Some(parent) => {
                let parent_id = self.resolve_module(parent)?;
                let id = self.store().mutator().create_sub_module(&parent_id, data)?;
                (id, self.engine.sync_module(parent_id).await?)
            }
            None => {
                let id = self.store().create_module(data)?;
                let mut sync = self.engine.sync_module(id).await?;
                self.refresh_index(&mut sync).await?;
                (id, sync)
            }
        };
        to_json(&json!({ "module": self.module_view(&id)?, "sync": sync }))
    }

    async fn handle_add_endpoint(
        &self,
        module: &str,
        name: &str,
        declaration: &str,
        description: &str,
    ) -> Result<String, CatalogError> {
        let module_id = self.resolve_module(module)?;
        let id = self.store().create_endpoint(NewEndpoint {
            module_id,
            name: name.to_string(),
            declaration: declaration.to_string(),
            description: description.to_string(),
        })?;
        let sync = self.engine.sync_module(module_id).await?;
        let endpoint = self
            .store()
            .get_endpoint(&id)?
            .ok_or_else(|| CatalogError::endpoint_not_found(id))?;
        to_json(&json!({ "endpoint": endpoint, "sync": sync }))
    }

    async fn handle_update_module(
        &self,
        module: &str,
        patch: ModulePatch,
    ) -> Result<String, CatalogError> {
        let id = self.resolve_module(module)?;
        let renamed = patch.name.is_some();
        let updated = self.store().update_module(&id, patch)?;

        // A rename moves the module's documents and changes its parent's links.
        let target = match updated.parent_module_id {
            Some(parent_id) if renamed => parent_id,
            _ => id,
        };
        let mut sync = self.engine.sync_module(target).await?;
        if renamed && updated.is_root() {
            self.refresh_index(&mut sync).await?;
        }
        to_json(&json!({ "module": self.module_view(&id)?, "sync": sync }))
    }

    async fn handle_update_endpoint(
        &self,
        id: &EntityId,
        patch: EndpointPatch,
    ) -> Result<String, CatalogError> {
        let updated = self.store().update_endpoint(id, patch)?;
        let sync = self.engine.sync_module(updated.module_id).await?;
        to_json(&json!({ "endpoint": updated, "sync": sync }))
    }

    fn handle_list_modules(
        &self,
        filter: Option<&str>,
        detached: bool,
    ) -> Result<String, CatalogError> {
        let filter = name_filter(filter);
        let modules = if detached {
            self.store()
                .detached_modules()?
                .into_iter()
                .filter(|m| filter.matches(&m.name))
                .collect()
        } else {
            self.store().list_modules(&filter)?
        };
        to_json(&modules)
    }

    fn handle_show_module(
        &self,
        id: Option<&EntityId>,
        path: Option<&str>,
    ) -> Result<String, CatalogError> {
        let id = match (id, path) {
            (Some(id), _) => *id,
            (None, Some(path)) => self
                .store()
                .resolver()
                .resolve_path(path)?
                .ok_or_else(|| no_module_at(path))?,
            (None, None) => {
                return Err(CatalogError::PreconditionFailed(
                    "show-module needs --id or --path".to_string(),
                ))
            }
        };
        to_json(&self.module_view(&id)?)
    }

    async fn handle_move_module(&self, module: &str, to: &str) -> Result<String, CatalogError> {
        let id = self.resolve_module(module)?;
        let new_parent = self.resolve_module(to)?;
        let old_parent = self
            .store()
            .get_module(&id)?
            .and_then(|m| m.parent_module_id);

        self.store().mutator().move_sub_module(&id, &new_parent)?;

        let mut syncs: Vec<SyncReport> = Vec::new();
        if let Some(old_parent) = old_parent {
            syncs.push(self.engine.sync_module(old_parent).await?);
        }
        let mut sync = self.engine.sync_module(new_parent).await?;
        if old_parent.is_none() {
            // A parentless module may have been listed in the index.
            self.refresh_index(&mut sync).await?;
        }
        syncs.push(sync);
        to_json(&json!({ "module": self.module_view(&id)?, "sync": syncs }))
    }

    async fn handle_detach_module(&self, parent: &str, child: &str) -> Result<String, CatalogError> {
        let parent_id = self.resolve_module(parent)?;
        let child_id = self.resolve_module(child)?;
        self.store()
            .mutator()
            .remove_sub_module(&parent_id, &child_id)?;
        let sync = self.engine.sync_module(parent_id).await?;
        to_json(&json!({ "module": self.module_view(&child_id)?, "sync": sync }))
    }

    /// Rewrite the top-level index and fold its write into `report`.
    async fn refresh_index(&self, report: &mut SyncReport) -> Result<(), CatalogError> {
        let index = self.engine.sync_index().await?;
        report.documents.extend(index.documents);
        report.duration_ms += index.duration_ms;
        report.index = true;
        Ok(())
    }

    /// Resolve a module argument given as an id or a slash-separated path.
    fn resolve_module(&self, arg: &str) -> Result<EntityId, CatalogError> {
        if let Ok(id) = arg.parse::<EntityId>() {
            return match self.store().get_module(&id)? {
                Some(module) => Ok(module.id),
                None => Err(CatalogError::module_not_found(id)),
            };
        }
        self.store()
            .resolver()
            .resolve_path(arg)?
            .ok_or_else(|| no_module_at(arg))
    }

    fn module_view(&self, id: &EntityId) -> Result<ModuleView, CatalogError> {
        let module = self
            .store()
            .get_module(id)?
            .ok_or_else(|| CatalogError::module_not_found(*id))?;
        let path = self.store().resolver().path_of(id)?.map(|p| p.to_string());
        Ok(ModuleView { module, path })
    }
}

fn name_filter(filter: Option<&str>) -> NameFilter {
    filter.map(NameFilter::containing).unwrap_or_default()
}

fn no_module_at(path: &str) -> CatalogError {
    CatalogError::PreconditionFailed(format!("No module at path '{}'", path))
}
