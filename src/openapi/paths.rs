//! Path-key derivation: wildcard translation and collision handling.

use indexmap::IndexMap;

use crate::openapi::document::{Parameter, ParameterIn, PathItem};

/// Route wildcard marker.
pub const WILDCARD: char = '*';

/// Name of the path parameter a wildcard becomes.
pub const WILDCARD_PARAM: &str = "params";

/// Inserted between a colliding path key and its counter value.
pub const REPEAT_SUFFIX: &str = "-REPEAT-URI-";

/// Translate a route URI into a path key.
///
/// Everything from the first wildcard on is replaced by `{params}`. Returns
/// the key and whether a wildcard was found.
pub fn translate(uri: &str) -> (String, bool) {
    match uri.split_once(WILDCARD) {
        Some((prefix, _)) => (format!("{prefix}{{{WILDCARD_PARAM}}}"), true),
        None => (uri.to_string(), false),
    }
}

/// The required string parameter standing in for a wildcard.
pub fn wildcard_parameter() -> Parameter {
    Parameter {
        name: WILDCARD_PARAM.to_string(),
        location: ParameterIn::Path,
        description: Some("params in path".to_string()),
        required: true,
        schema: Some(serde_json::json!({ "type": "string" })),
    }
}

/// Hands out unique path keys for one projection.
///
/// The counter lives and dies with the allocator, so separate projections
/// never influence each other's suffixes.
#[derive(Debug, Default)]
pub struct PathAllocator {
    collisions: u64,
}

impl PathAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` itself if free in `paths`, else `key` plus the repeat suffix and
    /// the next counter value not yet taken.
    pub fn allocate(&mut self, key: &str, paths: &IndexMap<String, PathItem>) -> String {
        if !paths.contains_key(key) {
            return key.to_string();
        }
        loop {
            self.collisions += 1;
            let candidate = format!("{key}{REPEAT_SUFFIX}{}", self.collisions);
            if !paths.contains_key(&candidate) {
                tracing::debug!(path = %key, assigned = %candidate, "Path key collision");
                return candidate;
            }
        }
    }
}
