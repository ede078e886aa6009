//! Bundle import.

use serde::{Deserialize, Serialize};

use crate::bundle::{Bundle, BundleError, BundleResult};
use crate::entity::{Consumer, Route, Service, Typed, Upstream};
use crate::error::EngineError;
use crate::resolve::Resolver;
use crate::store::{StagedStore, Store, StoreError, StoreExt};
use crate::variables::{substitute_route, substitute_service, substitute_upstream, VariableSet};

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub routes: usize,
    pub services: usize,
    pub upstreams: usize,
    pub consumers: usize,
    pub variables: usize,
}

/// Import a bundle into `store`.
///
/// Placeholders are substituted from the bundle's own variables. An entity
/// whose key is already stored is stamped as an update of that record and
/// keeps its creation time; any other is stamped as newly created. All
/// references are checked
/// against the bundle layered over the live store. Nothing is written
/// unless every check passes.
pub fn import_bundle(store: &dyn Store, bundle: Bundle) -> BundleResult<ImportSummary> {
    let Bundle {
        routes,
        services,
        upstreams,
        consumers,
        variables,
    } = bundle;

    if let Some(position) = consumers.iter().position(|c| c.username.is_empty()) {
        return Err(BundleError::Invalid(format!(
            "consumer #{position} has no username"
        )));
    }

    let vars = VariableSet::from(variables.as_slice());
    let summary = ImportSummary {
        routes: routes.len(),
        services: services.len(),
        upstreams: upstreams.len(),
        consumers: consumers.len(),
        variables: vars.len(),
    };

    let staged = StagedStore::new(store);

    for mut upstream in upstreams {
        substitute_upstream(&mut upstream, &vars);
        match stored::<Upstream>(store, upstream.base.id_str())? {
            Some(existing) => upstream.base.updating(&existing.base),
            None => upstream.base.creating(),
        }
        stage(&staged, upstream)?;
    }

    let mut staged_services = Vec::with_capacity(services.len());
    for mut service in services {
        substitute_service(&mut service, &vars);
        match stored::<Service>(store, service.base.id_str())? {
            Some(existing) => service.base.updating(&existing.base),
            None => service.base.creating(),
        }
        staged_services.push(service.clone());
        stage(&staged, service)?;
    }

    let mut staged_routes = Vec::with_capacity(routes.len());
    for mut route in routes {
        substitute_route(&mut route, &vars);
        match stored::<Route>(store, route.base.id_str())? {
            Some(existing) => route.base.updating(&existing.base),
            None => route.base.creating(),
        }
        staged_routes.push(route.clone());
        stage(&staged, route)?;
    }

    for mut consumer in consumers {
        match stored::<Consumer>(store, &consumer.username)? {
            Some(existing) => consumer.updating(&existing),
            None => consumer.creating(),
        }
        stage(&staged, consumer)?;
    }

    let resolver = Resolver::new(&staged);
    for service in &staged_services {
        resolver.resolve_service_upstream(service)?;
    }
    for route in &staged_routes {
        resolver.resolve_route(route)?;
    }

    staged.commit().map_err(EngineError::from)?;

    tracing::info!(
        routes = summary.routes,
        services = summary.services,
        upstreams = summary.upstreams,
        consumers = summary.consumers,
        variables = summary.variables,
        "Imported configuration bundle"
    );
    Ok(summary)
}

/// The live record under `key`, if there is one.
fn stored<T: Typed>(store: &dyn Store, key: &str) -> BundleResult<Option<T>> {
    if key.is_empty() {
        return Ok(None);
    }
    match store.fetch::<T>(key) {
        Ok(existing) => Ok(Some(existing)),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(err) => Err(BundleError::Engine(err.into())),
    }
}

fn stage<T: Typed>(staged: &StagedStore<'_>, entity: T) -> BundleResult<()> {
    staged
        .put(entity.into_entity())
        .map_err(|err| BundleError::Engine(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BaseInfo, EntityKind, Node, UpstreamBinding, UpstreamDef, Variable};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn bundle_with_dangling_route() -> Bundle {
        Bundle {
            routes: vec![Route {
                base: BaseInfo::with_id("r1"),
                service_id: Some("missing".into()),
                ..Route::default()
            }],
            services: vec![Service {
                base: BaseInfo::with_id("s1"),
                ..Service::default()
            }],
            ..Bundle::default()
        }
    }

    #[test]
    fn test_nothing_written_when_validation_fails() {
        let store = MemoryStore::new();
        let err = import_bundle(&store, bundle_with_dangling_route()).unwrap_err();
        assert!(matches!(
            err,
            BundleError::Engine(EngineError::NotFound {
                kind: EntityKind::Service,
                ..
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_references_resolve_within_bundle() {
        let store = MemoryStore::new();
        let bundle = Bundle {
            routes: vec![Route {
                base: BaseInfo::with_id("r1"),
                name: "r".into(),
                host: Some("${Route.r_r1.Host}".into()),
                service_id: Some("s1".into()),
                ..Route::default()
            }],
            services: vec![Service {
                base: BaseInfo::with_id("s1"),
                upstream: UpstreamBinding::inline(UpstreamDef::with_nodes(vec![Node::new(
                    "${svc}", 80, 1,
                )])),
                ..Service::default()
            }],
            variables: vec![
                Variable::new("Route.r_r1.Host", "api.example.com"),
                Variable::new("svc", "10.1.1.1"),
            ],
            ..Bundle::default()
        };

        let summary = import_bundle(&store, bundle).unwrap();
        assert_eq!(summary.routes, 1);
        assert_eq!(summary.variables, 2);

        let route: Route = store.fetch("r1").unwrap();
        assert_eq!(route.host.as_deref(), Some("api.example.com"));
        assert!(route.base.create_time() > 0);

        let service: Service = store.fetch("s1").unwrap();
        assert_eq!(service.upstream.as_inline().unwrap().nodes[0].host, "10.1.1.1");
    }

    #[test]
    fn test_consumer_without_username_is_rejected() {
        let store = MemoryStore::new();
        let bundle = Bundle {
            consumers: vec![Default::default()],
            ..Bundle::default()
        };
        assert!(matches!(
            import_bundle(&store, bundle),
            Err(BundleError::Invalid(_))
        ));
    }

    #[test]
    fn test_reimport_keeps_create_time() {
        let store = MemoryStore::new();
        let existing: Route = serde_json::from_value(json!({
            "id": "r1",
            "name": "r",
            "uri": "/old",
            "create_time": 1000,
            "update_time": 1000
        }))
        .unwrap();
        store.put(existing.into_entity()).unwrap();
        store
            .put(
                Consumer {
                    username: "jack".into(),
                    create_time: 2000,
                    update_time: 2000,
                    ..Consumer::default()
                }
                .into_entity(),
            )
            .unwrap();

        let bundle = Bundle {
            routes: vec![Route {
                base: BaseInfo::with_id("r1"),
                name: "r".into(),
                uri: Some("/new".into()),
                ..Route::default()
            }],
            consumers: vec![Consumer {
                username: "jack".into(),
                ..Consumer::default()
            }],
            ..Bundle::default()
        };
        import_bundle(&store, bundle).unwrap();

        let route: Route = store.fetch("r1").unwrap();
        assert_eq!(route.uri.as_deref(), Some("/new"));
        assert_eq!(route.base.create_time(), 1000);
        assert!(route.base.update_time() > 1000);

        let consumer: Consumer = store.fetch("jack").unwrap();
        assert_eq!(consumer.create_time, 2000);
        assert!(consumer.update_time > 2000);
    }

    #[test]
    fn test_new_entity_is_stamped_as_created() {
        let store = MemoryStore::new();
        let bundle = Bundle {
            upstreams: vec![Upstream {
                base: BaseInfo::with_id("u1"),
                ..Upstream::default()
            }],
            ..Bundle::default()
        };
        import_bundle(&store, bundle).unwrap();

        let upstream: Upstream = store.fetch("u1").unwrap();
        assert!(upstream.base.create_time() > 0);
        assert_eq!(upstream.base.create_time(), upstream.base.update_time());
    }
}
