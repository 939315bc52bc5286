//! Hierarchical module paths and name normalization
//!
//! A module path is a `/`-delimited list of module names from a root module down
//! to the addressed module, e.g. `billing/invoices`. Empty segments are dropped,
//! so `/billing//invoices/` and `billing/invoices` denote the same path.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Hierarchy separator in module paths.
pub const SEPARATOR: char = '/';

/// Normalize a single name or path segment to NFC.
///
/// Stored names and looked-up segments both pass through this, so exact-name
/// comparisons are not defeated by composed vs. decomposed Unicode.
pub fn normalize_segment(segment: &str) -> String {
    segment.nfc().collect()
}

/// A parsed, non-empty module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePath {
    segments: Vec<String>,
}

impl ModulePath {
    /// Parse a path string. Returns `None` when no segments remain after
    /// dropping empty ones.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(normalize_segment)
            .collect();
        Self::from_segments(segments)
    }

    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Path of a root module.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; 1 for a root module.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Name of the addressed module.
    pub fn leaf(&self) -> &str {
        // Invariant: at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Prepend an ancestor's name. Used when walking parent pointers upward.
    pub(crate) fn push_front(&mut self, name: &str) {
        self.segments.insert(0, name.to_string());
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
