//! Property-based tests for tree and path invariants

mod tree_paths;
