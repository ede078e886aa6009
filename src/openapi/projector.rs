//! Route set → OpenAPI document.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::entity::Route;
use crate::error::EngineResult;
use crate::openapi::document::{
    Components, HttpMethod, Info, MediaType, OpenApiDocument, Operation, Parameter, ParameterIn,
    PathItem, RequestBody, Response, SecurityRequirement, SecurityScheme,
};
use crate::openapi::paths::{translate, wildcard_parameter, PathAllocator};
use crate::plugins::{inherit_labels, project_plugins, PluginProjection};
use crate::resolve::{ResolvedRoute, Resolver};
use crate::store::Store;

/// Prefix of every gateway-specific extension field.
pub const EXTENSION_PREFIX: &str = "x-gateway-";

/// Content type the validation body schema is published under.
const ANY_CONTENT: &str = "*/*";

/// Document-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectorSettings {
    pub title: String,
    pub openapi_version: String,
}

impl Default for ProjectorSettings {
    fn default() -> Self {
        Self {
            title: "RoutesExport".to_string(),
            openapi_version: "3.0.0".to_string(),
        }
    }
}

pub struct Projector<'a, S: Store + ?Sized> {
    resolver: Resolver<'a, S>,
    settings: ProjectorSettings,
}

impl<'a, S: Store + ?Sized> Projector<'a, S> {
    pub fn new(store: &'a S, settings: ProjectorSettings) -> Self {
        Self {
            resolver: Resolver::new(store),
            settings,
        }
    }

    /// Project `routes`, in order, into one document.
    ///
    /// Any dangling reference or malformed plugin aborts the whole call.
    pub fn project(&self, routes: &[Route]) -> EngineResult<OpenApiDocument> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut components = Components::default();
        let mut allocator = PathAllocator::new();

        for route in routes {
            let resolved = self.resolver.resolve_route(route)?;
            let plugins = project_plugins(route, resolved.service.as_ref())?;

            for scheme in &plugins.security {
                components
                    .security_schemes
                    .entry(scheme.scheme_name().to_string())
                    .or_insert_with(|| SecurityScheme::from(*scheme));
            }

            let template = operation_template(route, &resolved, &plugins);
            let methods = route_methods(route);

            if route.uri_set().is_empty() {
                tracing::debug!(
                    route_id = %route.base.id_str(),
                    "Route has no URI; nothing to project"
                );
            }

            for uri in route.uri_set() {
                let (key, wildcard) = translate(uri);
                let key = allocator.allocate(&key, &paths);

                let mut operation = template.clone();
                if wildcard {
                    operation.parameters.insert(0, wildcard_parameter());
                }

                let mut item = PathItem::default();
                for method in &methods {
                    let mut op = operation.clone();
                    op.operation_id = format!("{}{}", route.name, method);
                    *item.slot_mut(*method) = Some(op);
                }
                paths.insert(key, item);
            }
        }

        tracing::info!(
            routes = routes.len(),
            paths = paths.len(),
            security_schemes = components.security_schemes.len(),
            "Projected routes to OpenAPI"
        );

        Ok(OpenApiDocument {
            openapi: self.settings.openapi_version.clone(),
            info: Info {
                title: self.settings.title.clone(),
                version: self.settings.openapi_version.clone(),
            },
            paths,
            components,
        })
    }
}

/// The route's explicit methods, or every verb when it lists none.
fn route_methods(route: &Route) -> Vec<HttpMethod> {
    if route.methods.is_empty() {
        return HttpMethod::ALL.to_vec();
    }

    let mut methods = Vec::with_capacity(route.methods.len());
    for raw in &route.methods {
        match raw.parse::<HttpMethod>() {
            Ok(method) if !methods.contains(&method) => methods.push(method),
            Ok(_) => {}
            Err(_) => {
                tracing::debug!(
                    route_id = %route.base.id_str(),
                    method = %raw,
                    "Skipping unknown method"
                )
            }
        }
    }
    methods
}

/// Everything shared by the operations generated for one route.
fn operation_template(
    route: &Route,
    resolved: &ResolvedRoute,
    plugins: &PluginProjection,
) -> Operation {
    let parameters: Vec<Parameter> = plugins
        .validation
        .header_params
        .iter()
        .map(|header| Parameter {
            name: header.name.clone(),
            location: ParameterIn::Header,
            description: None,
            required: header.required,
            schema: header
                .schema_type
                .as_ref()
                .map(|kind| serde_json::json!({ "type": kind })),
        })
        .collect();

    let request_body = plugins.validation.body_schema.as_ref().map(|schema| RequestBody {
        content: IndexMap::from([(
            ANY_CONTENT.to_string(),
            MediaType {
                schema: schema.clone(),
            },
        )]),
    });

    let security = plugins
        .security
        .iter()
        .map(|scheme| SecurityRequirement::from([(scheme.scheme_name().to_string(), Vec::new())]))
        .collect();

    Operation {
        operation_id: route.name.clone(),
        summary: route.desc.clone(),
        parameters,
        request_body,
        responses: Response::default_set(),
        security,
        extensions: extensions(route, resolved, plugins),
    }
}

fn extensions(
    route: &Route,
    resolved: &ResolvedRoute,
    plugins: &PluginProjection,
) -> IndexMap<String, Value> {
    let mut ext = Extensions::default();

    ext.put_opt("upstream", resolved.upstream.as_ref());
    ext.put_opt("host", route.host.as_ref());
    ext.put_list("hosts", &route.hosts);
    ext.put_opt(
        "labels",
        inherit_labels(route, resolved.service.as_ref()).as_ref(),
    );
    ext.put_opt("remote_addr", route.remote_addr.as_ref());
    ext.put_list("remote_addrs", &route.remote_addrs);
    ext.put_opt("filter_func", route.filter_func.as_ref());
    ext.put_opt("script", route.script.as_ref());
    ext.put_opt("service_protocol", route.service_protocol.as_ref());
    ext.put_list("vars", &route.vars);
    ext.put_opt(
        "id",
        (!route.base.id_str().is_empty()).then(|| route.base.id_str()),
    );
    if !plugins.generic.is_empty() {
        ext.put("plugins", &plugins.generic);
    }
    ext.put("priority", &route.priority);
    ext.put("status", &route.status);
    ext.put("enable_websocket", &route.enable_websocket);

    ext.0
}

#[derive(Default)]
struct Extensions(IndexMap<String, Value>);

impl Extensions {
    fn put<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.0.insert(format!("{EXTENSION_PREFIX}{name}"), value);
            }
            Err(e) => {
                tracing::warn!(extension = name, error = %e, "Dropping unserializable extension");
            }
        }
    }

    fn put_opt<T: Serialize>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.put(name, &value);
        }
    }

    fn put_list<T: Serialize>(&mut self, name: &str, values: &[T]) {
        if !values.is_empty() {
            self.put(name, values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BaseInfo, Node, Service, Typed, UpstreamBinding, UpstreamDef};
    use crate::error::EngineError;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn route(id: &str, uri: &str, methods: &[&str]) -> Route {
        Route {
            base: BaseInfo::with_id(id),
            name: format!("route{id}"),
            uri: Some(uri.to_string()),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            ..Route::default()
        }
    }

    fn project(store: &MemoryStore, routes: &[Route]) -> EngineResult<OpenApiDocument> {
        Projector::new(store, ProjectorSettings::default()).project(routes)
    }

    #[test]
    fn test_wildcard_route_with_two_methods() {
        let store = MemoryStore::new();
        let doc = project(&store, &[route("1", "/a/*", &["GET", "post"])]).unwrap();

        assert_eq!(doc.paths.len(), 1);
        let item = &doc.paths["/a/{params}"];
        let get = item.get.as_ref().unwrap();
        let post = item.post.as_ref().unwrap();
        assert!(item.put.is_none());

        assert_eq!(get.operation_id, "route1GET");
        assert_eq!(post.operation_id, "route1POST");
        for op in [get, post] {
            assert_eq!(op.parameters[0].name, "params");
            assert_eq!(op.parameters[0].location, ParameterIn::Path);
            assert!(op.parameters[0].required);
            assert_eq!(op.parameters[0].schema, Some(json!({ "type": "string" })));
        }
    }

    #[test]
    fn test_colliding_paths_are_both_kept() {
        let store = MemoryStore::new();
        let doc = project(
            &store,
            &[route("1", "/foo/*", &["GET"]), route("2", "/foo/*", &["GET"])],
        )
        .unwrap();

        let keys: Vec<_> = doc.paths.keys().cloned().collect();
        assert_eq!(keys, vec!["/foo/{params}", "/foo/{params}-REPEAT-URI-1"]);
        assert_eq!(
            doc.paths["/foo/{params}-REPEAT-URI-1"].get.as_ref().unwrap().operation_id,
            "route2GET"
        );
    }

    #[test]
    fn test_uris_replace_uri_and_methods_default_to_all() {
        let store = MemoryStore::new();
        let mut r = route("1", "/ignored", &[]);
        r.uris = vec!["/x".into(), "/y".into()];

        let doc = project(&store, &[r]).unwrap();
        assert!(doc.paths.get("/ignored").is_none());
        assert_eq!(doc.paths["/x"].operations().count(), HttpMethod::ALL.len());
        assert!(doc.paths["/y"].connect.is_some());
    }

    #[test]
    fn test_key_auth_becomes_security_scheme() {
        let store = MemoryStore::new();
        let mut r = route("1", "/secure", &["GET"]);
        r.plugins = json!({ "key-auth": {}, "limit-count": { "count": 1 } }).as_object().cloned();

        let doc = project(&store, &[r]).unwrap();
        assert_eq!(
            doc.components.security_schemes.keys().collect::<Vec<_>>(),
            vec!["api_key"]
        );

        let op = doc.paths["/secure"].get.as_ref().unwrap();
        assert_eq!(op.security.len(), 1);
        assert!(op.security[0].contains_key("api_key"));
        let generic = &op.extensions["x-gateway-plugins"];
        assert!(generic.get("key-auth").is_none());
        assert!(generic.get("limit-count").is_some());
    }

    #[test]
    fn test_no_schemes_when_no_auth_plugins() {
        let store = MemoryStore::new();
        let doc = project(&store, &[route("1", "/open", &["GET"])]).unwrap();
        assert!(doc.components.security_schemes.is_empty());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["components"], json!({}));
    }

    #[test]
    fn test_extensions_carry_resolved_upstream_and_inherited_labels() {
        let store = MemoryStore::new();
        store
            .put(
                Service {
                    base: BaseInfo::with_id("s1"),
                    upstream: UpstreamBinding::inline(UpstreamDef::with_nodes(vec![Node::new(
                        "svc", 80, 1,
                    )])),
                    labels: Some([("env".to_string(), "prod".to_string())].into()),
                    ..Service::default()
                }
                .into_entity(),
            )
            .unwrap();

        let mut r = route("1", "/svc", &["GET"]);
        r.service_id = Some("s1".into());
        r.desc = Some("service backed".into());

        let doc = project(&store, &[r]).unwrap();
        let op = doc.paths["/svc"].get.as_ref().unwrap();

        assert_eq!(op.summary.as_deref(), Some("service backed"));
        assert_eq!(op.extensions["x-gateway-upstream"]["nodes"][0]["host"], json!("svc"));
        assert_eq!(op.extensions["x-gateway-labels"], json!({ "env": "prod" }));
        assert_eq!(op.extensions["x-gateway-id"], json!("1"));
        assert_eq!(op.extensions["x-gateway-status"], json!(1));
        assert_eq!(op.extensions["x-gateway-enable_websocket"], json!(false));
        assert!(op.extensions.get("x-gateway-plugins").is_none());
    }

    #[test]
    fn test_request_validation_projects_headers_and_body() {
        let store = MemoryStore::new();
        let mut r = route("1", "/orders", &["POST"]);
        r.plugins = json!({
            "request-validation": {
                "header_schema": {
                    "required": ["x-id"],
                    "properties": { "x-id": { "type": "string" } }
                },
                "body_schema": { "type": "object" }
            }
        })
        .as_object()
        .cloned();

        let doc = project(&store, &[r]).unwrap();
        let op = doc.paths["/orders"].post.as_ref().unwrap();

        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].location, ParameterIn::Header);
        assert!(op.parameters[0].required);
        assert_eq!(
            op.request_body.as_ref().unwrap().content["*/*"].schema,
            json!({ "type": "object" })
        );
        assert!(op.extensions.get("x-gateway-plugins").is_none());
    }

    #[test]
    fn test_dangling_service_aborts_projection() {
        let store = MemoryStore::new();
        let ok = route("1", "/ok", &["GET"]);
        let mut bad = route("2", "/bad", &["GET"]);
        bad.service_id = Some("missing".into());

        let err = project(&store, &[ok, bad]).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_malformed_validation_aborts_projection() {
        let store = MemoryStore::new();
        let mut r = route("1", "/x", &["GET"]);
        r.plugins = json!({ "request-validation": { "header_schema": { "properties": 1 } } })
            .as_object()
            .cloned();
        assert!(matches!(
            project(&store, &[r]),
            Err(EngineError::MalformedPluginData { .. })
        ));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_unserializable_extension_is_skipped() {
        let mut ext = Extensions::default();
        ext.put("broken", &Unserializable);
        ext.put("priority", &7);

        assert!(ext.0.get("x-gateway-broken").is_none());
        assert_eq!(ext.0.get("x-gateway-priority"), Some(&json!(7)));
        assert_eq!(ext.0.len(), 1);
    }
}
