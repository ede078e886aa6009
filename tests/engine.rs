//! End-to-end engine tests over an in-memory store.

use pretty_assertions::assert_eq;
use serde_json::json;

use gateway_admin::bundle::{decode, encode, export_bundle, import_bundle, BundleFormat};
use gateway_admin::entity::{Consumer, Node, Route, Service, Upstream, UpstreamBinding, UpstreamDef};
use gateway_admin::error::EngineError;
use gateway_admin::openapi::document::SecurityRequirement;
use gateway_admin::openapi::{Projector, ProjectorSettings};
use gateway_admin::resolve::Resolver;
use gateway_admin::store::{MemoryStore, StoreExt};

mod common;

#[test]
fn test_bundle_round_trip_restores_literal_values() {
    let source = common::populated_store();
    let bundle = export_bundle(&source).unwrap();

    // Everything sensitive left the entities.
    let exported_route = &bundle.routes[0];
    assert_eq!(exported_route.host.as_deref(), Some("${Route.list-orders_r1.Host}"));
    assert_eq!(bundle.variables.len(), 5);
    assert_eq!(
        exported_route.plugins.as_ref().unwrap()["onbehalf-jwt"]["secret"],
        json!("${Route.list-orders_r1.Plugin.OnBehalf}")
    );
    assert_eq!(bundle.upstreams[0].def.nodes[1].host, "${Upstream.backend_u1.Host.1}");

    let text = encode(&bundle, BundleFormat::Yaml).unwrap();

    let target = MemoryStore::new();
    let decoded = decode(&text, Some(BundleFormat::Yaml)).unwrap();
    let summary = import_bundle(&target, decoded).unwrap();
    assert_eq!(summary.routes, 1);
    assert_eq!(summary.services, 1);
    assert_eq!(summary.upstreams, 1);
    assert_eq!(summary.consumers, 1);
    assert_eq!(summary.variables, 5);

    let before: Route = source.fetch("r1").unwrap();
    let after: Route = target.fetch("r1").unwrap();
    assert_eq!(after.host, before.host);
    assert_eq!(after.upstream, before.upstream);
    assert_eq!(after.plugins, before.plugins);
    assert_eq!(after.methods, before.methods);
    assert!(after.base.create_time() > 0);

    let upstream: Upstream = target.fetch("u1").unwrap();
    let hosts: Vec<_> = upstream.def.nodes.iter().map(|n| n.host.as_str()).collect();
    assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);

    let service: Service = target.fetch("s1").unwrap();
    assert_eq!(service.upstream, UpstreamBinding::reference("u1"));

    let consumer: Consumer = target.fetch("jack").unwrap();
    assert_eq!(consumer.plugins.unwrap()["key-auth"]["key"], json!("auth-one"));
}

#[test]
fn test_projection_of_service_bound_route() {
    let store = common::populated_store();
    let route: Route = store.fetch("r1").unwrap();

    let doc = Projector::new(&store, ProjectorSettings::default())
        .project(&[route])
        .unwrap();

    assert_eq!(doc.openapi, "3.0.0");
    assert_eq!(doc.info.title, "RoutesExport");

    let item = &doc.paths["/orders/{params}"];
    let get = item.get.as_ref().unwrap();
    let post = item.post.as_ref().unwrap();
    assert_eq!(get.operation_id, "list-ordersGET");
    assert_eq!(post.operation_id, "list-ordersPOST");

    // key-auth comes from the service and is classified as security.
    let expected: SecurityRequirement = [("api_key".to_string(), Vec::new())].into();
    assert_eq!(get.security, vec![expected]);
    assert!(doc.components.security_schemes.contains_key("api_key"));

    // The route's own inline upstream shadows the service's reference.
    assert_eq!(get.extensions["x-gateway-upstream"]["nodes"][0]["host"], json!("10.1.0.7"));
    assert_eq!(
        get.extensions["x-gateway-plugins"],
        json!({ "onbehalf-jwt": { "secret": "s3cr3t", "ttl": 60 } })
    );
    assert_eq!(get.extensions["x-gateway-host"], json!("api.example.com"));
}

#[test]
fn test_projection_follows_service_upstream_reference() {
    let store = MemoryStore::new();
    common::put(&store, common::upstream("u1", "backend", &["10.0.0.1"]));
    common::put(&store, common::service("s1", "orders", UpstreamBinding::reference("u1")));
    let mut route = common::route("r1", "orders", "/orders");
    route.service_id = Some("s1".into());

    let doc = Projector::new(&store, ProjectorSettings::default())
        .project(&[route])
        .unwrap();
    let op = doc.paths["/orders"].get.as_ref().unwrap();
    assert_eq!(op.extensions["x-gateway-upstream"]["nodes"][0]["host"], json!("10.0.0.1"));
}

#[test]
fn test_projection_fails_on_unknown_upstream() {
    let store = MemoryStore::new();
    let mut route = common::route("r1", "orders", "/orders");
    route.upstream = UpstreamBinding::reference("missing");

    let result = Projector::new(&store, ProjectorSettings::default()).project(&[route]);
    assert!(matches!(result, Err(EngineError::NotFound { .. })));
}

#[test]
fn test_inline_upstream_resolves_without_store_reads() {
    let store = common::CountingStore::new(MemoryStore::new());
    let mut route = common::route("r1", "orders", "/orders");
    route.upstream =
        UpstreamBinding::inline(UpstreamDef::with_nodes(vec![Node::new("10.0.0.5", 80, 1)]));

    let upstream = Resolver::new(&store).resolve_upstream(&route).unwrap().unwrap();
    assert_eq!(upstream.nodes[0].host, "10.0.0.5");
    assert_eq!(store.gets(), 0);
}

#[test]
fn test_service_chain_costs_one_read_per_hop() {
    let inner = MemoryStore::new();
    common::put(&inner, common::upstream("u1", "backend", &["10.0.0.1"]));
    common::put(&inner, common::service("s1", "orders", UpstreamBinding::reference("u1")));
    let store = common::CountingStore::new(inner);

    let mut route = common::route("r1", "orders", "/orders");
    route.service_id = Some("s1".into());

    Resolver::new(&store).resolve_upstream(&route).unwrap().unwrap();
    assert_eq!(store.gets(), 2);
}

#[test]
fn test_failed_import_leaves_target_untouched() {
    let target = MemoryStore::new();
    let mut bundle = export_bundle(&common::populated_store()).unwrap();
    bundle.upstreams.clear();

    assert!(import_bundle(&target, bundle).is_err());
    assert!(target.is_empty());
}

#[test]
fn test_ambiguous_variable_keys_keep_their_own_values() {
    let source = MemoryStore::new();
    let mut first = common::route("2", "a_1", "/one");
    first.host = Some("one.example.com".into());
    let mut second = common::route("1_2", "a", "/two");
    second.host = Some("two.example.com".into());
    common::put(&source, first);
    common::put(&source, second);

    let bundle = export_bundle(&source).unwrap();
    assert_eq!(bundle.variables.len(), 2);

    let target = MemoryStore::new();
    import_bundle(&target, bundle).unwrap();

    let first: Route = target.fetch("2").unwrap();
    let second: Route = target.fetch("1_2").unwrap();
    assert_eq!(first.host.as_deref(), Some("one.example.com"));
    assert_eq!(second.host.as_deref(), Some("two.example.com"));
}
