//! Integration tests for the docsync catalog

mod sync_engine;
mod tree_structure;
