//! Configuration for building a pointer index.

use serde::{Deserialize, Serialize};

/// Configuration for [`PointerIndex::build_with_config`](super::PointerIndex::build_with_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum container nesting depth (default: 127).
    ///
    /// `serde_json` stops decoding at 128 levels, so with the default every
    /// indexed value can also be decoded.
    pub max_depth: usize,
    /// Accept bytes after the root value instead of failing (default: false)
    pub allow_trailing_content: bool,
    /// Initial capacity of the path map (default: 0)
    pub capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_depth: 127,
            allow_trailing_content: false,
            capacity: 0,
        }
    }
}

impl IndexConfig {
    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Allow or reject trailing content after the root value.
    pub fn with_trailing_content(mut self, allow: bool) -> Self {
        self.allow_trailing_content = allow;
        self
    }

    /// Pre-size the path map for roughly `capacity` entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
