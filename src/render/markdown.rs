//! Markdown renderer

use super::layout::{endpoint_doc, module_doc, relative_link, INDEX_DOC};
use super::DocumentRenderer;
use crate::error::CatalogError;
use crate::model::{Endpoint, Module};
use crate::tree::ModulePath;
use crate::types::ModuleRef;
use async_trait::async_trait;
use std::fmt::Write;

/// Default renderer producing plain CommonMark.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    index_title: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            index_title: "API Documentation".to_string(),
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_title(mut self, title: impl Into<String>) -> Self {
        self.index_title = title.into();
        self
    }

    pub fn module_markdown(&self, module: &Module, path: &ModulePath) -> String {
        let here = module_doc(path);
        let mut out = String::new();

        let _ = writeln!(out, "# {}\n", module.name);
        let _ = writeln!(out, "**Path:** `{}`\n", path);
        if let Some(parent) = path.parent() {
            let _ = writeln!(
                out,
                "**Parent:** [{}]({})\n",
                parent.leaf(),
                relative_link(&here, &module_doc(&parent))
            );
        }

        let _ = writeln!(out, "## Description\n\n{}\n", module.description);

        out.push_str("## Endpoints\n\n");
        if module.endpoints.is_empty() {
            out.push_str("_None_\n");
        }
        for endpoint in &module.endpoints {
            let target = endpoint_doc(path, &endpoint.name);
            let _ = writeln!(
                out,
                "- [{}]({})",
                endpoint.name,
                relative_link(&here, &target)
            );
        }

        out.push_str("\n## Submodules\n\n");
        if module.children.is_empty() {
            out.push_str("_None_\n");
        }
        for child in &module.children {
            let target = module_doc(&path.child(&child.name));
            let _ = writeln!(out, "- [{}]({})", child.name, relative_link(&here, &target));
        }
        out
    }

    pub fn endpoint_markdown(
        &self,
        endpoint: &Endpoint,
        module: &Module,
        module_path: &ModulePath,
    ) -> String {
        let here = endpoint_doc(module_path, &endpoint.name);
        let back = relative_link(&here, &module_doc(module_path));
        format!(
            "# {}\n\n**Module:** [{}]({})\n\n## Declaration\n\n```\n{}\n```\n\n## Description\n\n{}\n",
            endpoint.name, module.name, back, endpoint.declaration, endpoint.description
        )
    }

    pub fn index_markdown(&self, roots: &[ModuleRef]) -> String {
        let mut out = format!("# {}\n\n## Modules\n\n", self.index_title);
        if roots.is_empty() {
            out.push_str("_None_\n");
        }
        for root in roots {
            let target = module_doc(&ModulePath::root(root.name.clone()));
            let _ = writeln!(out, "- [{}]({})", root.name, relative_link(INDEX_DOC, &target));
        }
        out
    }
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render_module(
        &self,
        module: &Module,
        path: &ModulePath,
    ) -> Result<String, CatalogError> {
        Ok(self.module_markdown(module, path))
    }

    async fn render_endpoint(
        &self,
        endpoint: &Endpoint,
        module: &Module,
        module_path: &ModulePath,
    ) -> Result<String, CatalogError> {
        Ok(self.endpoint_markdown(endpoint, module, module_path))
    }

    async fn render_index(&self, roots: &[ModuleRef]) -> Result<String, CatalogError> {
        Ok(self.index_markdown(roots))
    }
}
