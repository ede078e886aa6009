//! Import-side substitution: placeholders out, values in.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::entity::{PluginMap, Route, Service, Upstream, UpstreamDef};
use crate::variables::keys::Scope;
use crate::variables::VariableSet;

/// Matches `${key}`.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Replace every `${key}` in `input` with its value.
///
/// A placeholder with no matching variable stays as literal text; the only
/// trace it leaves is a warning.
pub fn substitute_str(input: &str, vars: &VariableSet) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => {
                tracing::warn!(key = %&caps[1], "Unresolved variable placeholder left in place");
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn substitute_in_place(field: &mut String, vars: &VariableSet) {
    if field.contains("${") {
        *field = substitute_str(field, vars);
    }
}

pub fn substitute_route(route: &mut Route, vars: &VariableSet) {
    if let Some(host) = route.host.as_mut() {
        substitute_in_place(host, vars);
    }
    for host in &mut route.hosts {
        substitute_in_place(host, vars);
    }
    if let Some(def) = route.upstream.as_inline_mut() {
        substitute_nodes(def, vars);
    }
    let scope = Scope::route(route);
    if let Some(plugins) = route.plugins.as_mut() {
        substitute_plugin_secrets(plugins, &scope, vars);
    }
}

pub fn substitute_service(service: &mut Service, vars: &VariableSet) {
    if let Some(def) = service.upstream.as_inline_mut() {
        substitute_nodes(def, vars);
    }
}

pub fn substitute_upstream(upstream: &mut Upstream, vars: &VariableSet) {
    substitute_nodes(&mut upstream.def, vars);
}

fn substitute_nodes(def: &mut UpstreamDef, vars: &VariableSet) {
    for node in &mut def.nodes {
        substitute_in_place(&mut node.host, vars);
    }
}

fn substitute_plugin_secrets(plugins: &mut PluginMap, scope: &Scope, vars: &VariableSet) {
    for (plugin, config) in plugins.iter_mut() {
        let Some(config) = config.as_object_mut() else {
            continue;
        };
        for (field, value) in config.iter_mut() {
            if scope.plugin_secret(plugin, field).is_none() {
                continue;
            }
            if let Value::String(text) = value {
                substitute_in_place(text, vars);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BaseInfo, Node, UpstreamBinding, Variable};
    use crate::variables::extract::{extract_route, extract_upstream};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> VariableSet {
        pairs
            .iter()
            .map(|(k, v)| Variable::new(*k, *v))
            .collect::<Vec<_>>()
            .as_slice()
            .into()
    }

    #[test]
    fn test_embedded_placeholders() {
        let vars = vars(&[("A", "one"), ("B", "two")]);
        assert_eq!(substitute_str("${A}.${B}:${A}", &vars), "one.two:one");
    }

    #[test]
    fn test_unresolved_placeholder_stays_literal() {
        let vars = vars(&[("A", "one")]);
        assert_eq!(substitute_str("${A}-${MISSING}", &vars), "one-${MISSING}");
        assert_eq!(substitute_str("plain", &vars), "plain");
    }

    #[test]
    fn test_route_round_trip() {
        let original = Route {
            base: BaseInfo::with_id("9"),
            name: "api".into(),
            host: Some("api.example.com".into()),
            hosts: vec!["x.example.com".into()],
            upstream: UpstreamBinding::inline(UpstreamDef::with_nodes(vec![
                Node::new("10.0.0.1", 80, 1),
                Node::new("10.0.0.2", 81, 2),
            ])),
            plugins: json!({ "onbehalf-jwt": { "secret": "s3cret" } }).as_object().cloned(),
            ..Route::default()
        };

        let mut exported = original.clone();
        let mut set = VariableSet::new();
        extract_route(&mut exported, &mut set);
        assert_ne!(exported, original);

        let imported_vars: VariableSet = set.into_vec().as_slice().into();
        substitute_route(&mut exported, &imported_vars);
        assert_eq!(exported, original);
    }

    #[test]
    fn test_upstream_round_trip() {
        let original = Upstream {
            base: BaseInfo::with_id("u1"),
            def: UpstreamDef::with_nodes(vec![Node::new("backend", 8080, 1)]),
        };
        let mut exported = original.clone();
        let mut set = VariableSet::new();
        extract_upstream(&mut exported, &mut set);

        substitute_upstream(&mut exported, &set);
        assert_eq!(exported, original);
    }

    #[test]
    fn test_brace_in_name_round_trips() {
        let original = Route {
            base: BaseInfo::with_id("3"),
            name: "odd}name".into(),
            host: Some("odd.example.com".into()),
            ..Route::default()
        };
        let mut exported = original.clone();
        let mut set = VariableSet::new();
        extract_route(&mut exported, &mut set);

        substitute_route(&mut exported, &set);
        assert_eq!(exported, original);
    }
}
