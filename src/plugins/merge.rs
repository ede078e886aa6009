//! Merge-patch over plugin maps.

use serde_json::Value;

use crate::entity::PluginMap;

/// Deep-merge `patch` over `base`.
///
/// Objects present on both sides merge key by key; anything else on the
/// patch side replaces the base value. `null` is an ordinary leaf and does
/// not delete the base key.
pub fn merge_patch(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => Value::Object(merge_maps(base, patch)),
        (_, patch) => patch.clone(),
    }
}

/// Key-wise [`merge_patch`] of two maps. Keys only in the patch are added.
pub fn merge_maps(base: &PluginMap, patch: &PluginMap) -> PluginMap {
    let mut merged = base.clone();
    for (key, patch_value) in patch {
        let value = match base.get(key) {
            Some(base_value) => merge_patch(base_value, patch_value),
            None => patch_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Effective plugins of a route that may inherit from a service.
///
/// - route and service both define plugins: route merged over service
/// - only one side defines plugins: that side unchanged
/// - neither: empty
pub fn merge_plugins(route: Option<&PluginMap>, service: Option<&PluginMap>) -> PluginMap {
    match (route, service) {
        (Some(route), Some(service)) => merge_maps(service, route),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => PluginMap::new(),
    }
}
