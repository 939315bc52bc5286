//! Document locations under the docs root
//!
//! The docs tree mirrors the module tree:
//!
//! ```text
//! docs/
//! ├── index.md                      # root-index listing
//! ├── modules/
//! │   ├── billing.md                # module "billing"
//! │   └── billing/
//! │       └── invoices.md           # module "billing/invoices"
//! └── apis/
//!     └── billing/
//!         └── invoices/
//!             └── create.md         # endpoint "create" of "billing/invoices"
//! ```
//!
//! Locations are `/`-separated strings relative to the docs root.

use crate::tree::ModulePath;

pub const INDEX_DOC: &str = "index.md";
const MODULES_DIR: &str = "modules";
const APIS_DIR: &str = "apis";

/// Location of a module's document.
pub fn module_doc(path: &ModulePath) -> String {
    format!("{}/{}.md", MODULES_DIR, path)
}

/// Location of an endpoint's document, given its owning module's path.
pub fn endpoint_doc(module_path: &ModulePath, endpoint_name: &str) -> String {
    format!("{}/{}/{}.md", APIS_DIR, module_path, endpoint_name)
}

/// Relative link from the document at `from` to the document at `to`.
///
/// Both arguments are docs-root-relative locations.
pub fn relative_link(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = {
        let mut parts: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
        parts.pop();
        parts
    };
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let to_dir = &to_parts[..to_parts.len().saturating_sub(1)];

    let common = from_dir
        .iter()
        .zip(to_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut link: Vec<&str> = std::iter::repeat("..").take(from_dir.len() - common).collect();
    link.extend(&to_parts[common..]);
    link.join("/")
}
