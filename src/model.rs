//! Catalog records: modules, endpoints, and the inputs used to create and patch them.

use crate::error::CatalogError;
use crate::tree::path::{normalize_segment, SEPARATOR};
use crate::types::{EndpointRef, EntityId, ModuleRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A documented module: description, owned endpoints, and child modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// Owned endpoints, in creation order.
    #[serde(default)]
    pub endpoints: Vec<EndpointRef>,
    /// Child modules, in attach order.
    #[serde(default)]
    pub children: Vec<ModuleRef>,
    /// Absent for root modules.
    #[serde(default)]
    pub parent_module_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Build a new standalone module record with a fresh id.
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            name,
            description,
            endpoints: Vec::new(),
            children: Vec::new(),
            parent_module_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_ref(&self) -> ModuleRef {
        ModuleRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_module_id.is_none()
    }

    /// First child entry with exactly this name, in stored order.
    pub fn child_named(&self, name: &str) -> Option<&ModuleRef> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_child(&self, id: &EntityId) -> bool {
        self.children.iter().any(|c| c.id == *id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A leaf documentation record owned by exactly one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EntityId,
    pub module_id: EntityId,
    pub name: String,
    /// Declaration text, rendered verbatim in a code block.
    pub declaration: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Endpoint {
    pub fn new(module_id: EntityId, name: String, declaration: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            module_id,
            name,
            declaration,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_ref(&self) -> EndpointRef {
        EndpointRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input for creating a module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewModule {
    pub name: String,
    pub description: String,
}

impl NewModule {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Partial update of a module's own fields. Tree links are edited through the
/// tree mutator only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for creating an endpoint under an existing module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEndpoint {
    pub module_id: EntityId,
    pub name: String,
    pub declaration: String,
    pub description: String,
}

/// Partial update of an endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointPatch {
    pub name: Option<String>,
    pub declaration: Option<String>,
    pub description: Option<String>,
}

/// Case-insensitive substring filter on names. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameFilter {
    pub name: Option<String>,
}

impl NameFilter {
    pub fn containing(needle: impl Into<String>) -> Self {
        Self {
            name: Some(needle.into()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.name {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Validate a module or endpoint name and return its canonical (NFC) form.
pub fn validate_name(name: &str) -> Result<String, CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    if name.contains(SEPARATOR) {
        return Err(CatalogError::InvalidName {
            name: name.to_string(),
            reason: format!("name must not contain '{}'", SEPARATOR),
        });
    }
    let name = normalize_segment(name);
    if name == "." || name == ".." {
        return Err(CatalogError::InvalidName {
            reason: "name must not be a relative directory reference".to_string(),
            name,
        });
    }
    Ok(name)
}
