//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use gateway_admin::entity::{
    BaseInfo, Consumer, Entity, EntityKind, Node, PluginMap, Route, Service, Typed, Upstream,
    UpstreamBinding, UpstreamDef,
};
use gateway_admin::store::{MemoryStore, Predicate, Store, StoreResult};

pub fn plugins(value: serde_json::Value) -> PluginMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("plugins fixture must be an object, got {other}"),
    }
}

pub fn route(id: &str, name: &str, uri: &str) -> Route {
    Route {
        base: BaseInfo::with_id(id),
        name: name.into(),
        uri: Some(uri.into()),
        ..Route::default()
    }
}

pub fn upstream(id: &str, name: &str, hosts: &[&str]) -> Upstream {
    let mut def = UpstreamDef::with_nodes(hosts.iter().map(|h| Node::new(*h, 80, 1)).collect());
    def.name = Some(name.into());
    Upstream {
        base: BaseInfo::with_id(id),
        def,
    }
}

pub fn service(id: &str, name: &str, upstream: UpstreamBinding) -> Service {
    Service {
        base: BaseInfo::with_id(id),
        name: Some(name.into()),
        upstream,
        ..Service::default()
    }
}

pub fn put<T: Typed>(store: &dyn Store, entity: T) {
    store.put(entity.into_entity()).unwrap();
}

/// A store holding one of everything: a standalone upstream, a service that
/// references it, a route bound to that service with an inline upstream and
/// an onbehalf secret, and a consumer.
pub fn populated_store() -> MemoryStore {
    let store = MemoryStore::new();

    put(&store, upstream("u1", "backend", &["10.0.0.1", "10.0.0.2"]));

    let mut svc = service("s1", "orders", UpstreamBinding::reference("u1"));
    svc.hosts = vec!["orders.internal".into()];
    svc.plugins = Some(plugins(json!({ "key-auth": {} })));
    put(&store, svc);

    let mut r = route("r1", "list-orders", "/orders/*");
    r.methods = vec!["GET".into(), "POST".into()];
    r.host = Some("api.example.com".into());
    r.service_id = Some("s1".into());
    r.upstream =
        UpstreamBinding::inline(UpstreamDef::with_nodes(vec![Node::new("10.1.0.7", 8080, 1)]));
    r.plugins = Some(plugins(json!({
        "onbehalf-jwt": { "secret": "s3cr3t", "ttl": 60 }
    })));
    put(&store, r);

    put(
        &store,
        Consumer {
            username: "jack".into(),
            plugins: Some(plugins(json!({ "key-auth": { "key": "auth-one" } }))),
            ..Consumer::default()
        },
    );

    store
}

/// Wraps a store and counts reads, to prove what a caller did not fetch.
pub struct CountingStore<S> {
    inner: S,
    gets: AtomicUsize,
}

impl<S: Store> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl<S: Store> Store for CountingStore<S> {
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Entity> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(kind, id)
    }

    fn list(&self, kind: EntityKind, filter: Option<Predicate<'_>>) -> StoreResult<Vec<Entity>> {
        self.inner.list(kind, filter)
    }

    fn put(&self, entity: Entity) -> StoreResult<()> {
        self.inner.put(entity)
    }
}
