//! Docsync: Hierarchical API Catalog
//!
//! A catalog of modules and endpoints arranged as a tree, with a derived
//! markdown documentation tree kept in sync with the catalog's current state.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;
pub mod sync;
pub mod tree;
pub mod types;
