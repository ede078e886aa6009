//! Export-side extraction: literal values out, placeholders in.

use serde_json::Value;

use crate::entity::{PluginMap, Route, Service, Upstream, UpstreamDef};
use crate::variables::keys::Scope;
use crate::variables::VariableSet;

/// Externalize a route's hosts, inline upstream nodes and plugin secrets.
///
/// A referenced upstream is left alone; it is externalized once, at its own
/// top-level entity.
pub fn extract_route(route: &mut Route, vars: &mut VariableSet) {
    let scope = Scope::route(route);

    if let Some(host) = route.host.as_mut().filter(|h| !h.is_empty()) {
        *host = vars.insert(scope.host(), std::mem::take(host));
    }

    for (index, host) in route.hosts.iter_mut().enumerate() {
        *host = vars.insert(scope.hosts(index), std::mem::take(host));
    }

    if let Some(def) = route.upstream.as_inline_mut() {
        extract_nodes(def, vars, |i| scope.inline_node(i));
    }

    if let Some(plugins) = route.plugins.as_mut() {
        extract_plugin_secrets(plugins, &scope, vars);
    }
}

/// Externalize the nodes of a service's inline upstream.
pub fn extract_service(service: &mut Service, vars: &mut VariableSet) {
    let scope = Scope::service(service);
    if let Some(def) = service.upstream.as_inline_mut() {
        extract_nodes(def, vars, |i| scope.inline_node(i));
    }
}

/// Externalize the nodes of a standalone upstream.
pub fn extract_upstream(upstream: &mut Upstream, vars: &mut VariableSet) {
    let scope = Scope::upstream(upstream);
    extract_nodes(&mut upstream.def, vars, |i| scope.node(i));
}

fn extract_nodes(def: &mut UpstreamDef, vars: &mut VariableSet, key: impl Fn(usize) -> String) {
    for (index, node) in def.nodes.iter_mut().enumerate() {
        node.host = vars.insert(key(index), std::mem::take(&mut node.host));
    }
}

fn extract_plugin_secrets(plugins: &mut PluginMap, scope: &Scope, vars: &mut VariableSet) {
    for (plugin, config) in plugins.iter_mut() {
        let Some(config) = config.as_object_mut() else {
            continue;
        };
        for (field, value) in config.iter_mut() {
            let Some(key) = scope.plugin_secret(plugin, field) else {
                continue;
            };
            if let Some(text) = scalar_text(value) {
                *value = Value::String(vars.insert(key, text));
            }
        }
    }
}

/// Text form of a scalar secret. Structured values are not externalized.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
