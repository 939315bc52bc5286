//! Module Tree
//!
//! The catalog's modules form a forest: each module optionally points at its
//! parent, and each parent lists its children as denormalized `{id, name}`
//! pairs. The two sides are independent fields kept in step by the
//! [`TreeMutator`]; neither is ever derived from the other.

pub mod mutator;
pub mod path;
pub mod resolver;

pub use mutator::TreeMutator;
pub use path::ModulePath;
pub use resolver::PathResolver;
