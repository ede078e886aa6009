//! Effective-upstream resolution.
//!
//! # Data Flow
//! ```text
//! Route
//!     → inline upstream?           → done (store untouched)
//!     → upstream_id?               → Store::get(upstream)
//!     → service_id?                → Store::get(service)
//!         → service inline upstream? → done
//!         → service upstream_id?     → Store::get(upstream)
//!     → no effective upstream
//! ```
//!
//! # Design Decisions
//! - First match wins; a route's own binding shadows its service entirely
//! - A dangling reference is `EngineError::NotFound`, never skipped
//! - Lookups are plain blocking calls, one per dereference

use crate::entity::{EntityId, Route, Service, Upstream, UpstreamBinding, UpstreamDef};
use crate::error::EngineResult;
use crate::store::{Store, StoreExt};

/// A route together with everything it inherits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRoute {
    /// The referenced service, when the route has a `service_id`.
    pub service: Option<Service>,

    /// The effective upstream, if any level of the chain defines one.
    pub upstream: Option<UpstreamDef>,
}

/// Walks the route → service → upstream precedence chain against a store.
pub struct Resolver<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    /// The single effective upstream of a route.
    pub fn resolve_upstream(&self, route: &Route) -> EngineResult<Option<UpstreamDef>> {
        if let Some(def) = self.own_binding(&route.upstream, route.base.id_str())? {
            return Ok(Some(def));
        }

        match &route.service_id {
            Some(service_id) => {
                let service = self.fetch_service(service_id, route.base.id_str())?;
                self.resolve_service_upstream(&service)
            }
            None => Ok(None),
        }
    }

    /// The effective upstream of a service: inline first, then reference.
    pub fn resolve_service_upstream(&self, service: &Service) -> EngineResult<Option<UpstreamDef>> {
        self.own_binding(&service.upstream, service.base.id_str())
    }

    /// Resolve a route's service and upstream in one pass.
    ///
    /// The service is fetched whenever `service_id` is set, even if the route
    /// carries its own upstream, since plugins and labels are inherited from
    /// it independently.
    pub fn resolve_route(&self, route: &Route) -> EngineResult<ResolvedRoute> {
        let service = match &route.service_id {
            Some(service_id) => Some(self.fetch_service(service_id, route.base.id_str())?),
            None => None,
        };

        let upstream = match self.own_binding(&route.upstream, route.base.id_str())? {
            Some(def) => Some(def),
            None => match &service {
                Some(service) => self.resolve_service_upstream(service)?,
                None => None,
            },
        };

        Ok(ResolvedRoute { service, upstream })
    }

    /// Dereference a standalone upstream by id.
    pub fn fetch_upstream(&self, id: &EntityId, owner: &str) -> EngineResult<Upstream> {
        self.store.fetch::<Upstream>(id.as_str()).map_err(|err| {
            tracing::warn!(
                owner = %owner,
                upstream_id = %id,
                error = %err,
                "Upstream reference did not resolve"
            );
            err.into()
        })
    }

    /// Dereference a service by id.
    pub fn fetch_service(&self, id: &EntityId, owner: &str) -> EngineResult<Service> {
        self.store.fetch::<Service>(id.as_str()).map_err(|err| {
            tracing::warn!(
                owner = %owner,
                service_id = %id,
                error = %err,
                "Service reference did not resolve"
            );
            err.into()
        })
    }

    fn own_binding(
        &self,
        binding: &UpstreamBinding,
        owner: &str,
    ) -> EngineResult<Option<UpstreamDef>> {
        match binding {
            UpstreamBinding::Inline(def) => Ok(Some(def.as_ref().clone())),
            UpstreamBinding::Reference(id) => self.fetch_upstream(id, owner).map(|u| Some(u.def)),
            UpstreamBinding::None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BaseInfo, EntityKind, Node, Typed};
    use crate::error::EngineError;
    use crate::store::MemoryStore;

    fn def(host: &str) -> UpstreamDef {
        UpstreamDef::with_nodes(vec![Node::new(host, 80, 1)])
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .put(
                Upstream {
                    base: BaseInfo::with_id("u1"),
                    def: def("stored.upstream"),
                }
                .into_entity(),
            )
            .unwrap();
        store
            .put(
                Service {
                    base: BaseInfo::with_id("s-inline"),
                    upstream: UpstreamBinding::inline(def("service.inline")),
                    ..Service::default()
                }
                .into_entity(),
            )
            .unwrap();
        store
            .put(
                Service {
                    base: BaseInfo::with_id("s-ref"),
                    upstream: UpstreamBinding::reference("u1"),
                    ..Service::default()
                }
                .into_entity(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_inline_wins() {
        let store = store();
        let route = Route {
            upstream: UpstreamBinding::inline(def("route.inline")),
            service_id: Some("s-ref".into()),
            ..Route::default()
        };
        let resolved = Resolver::new(&store).resolve_upstream(&route).unwrap();
        assert_eq!(resolved, Some(def("route.inline")));
    }

    #[test]
    fn test_reference_is_dereferenced() {
        let store = store();
        let route = Route {
            upstream: UpstreamBinding::reference("u1"),
            ..Route::default()
        };
        let resolved = Resolver::new(&store).resolve_upstream(&route).unwrap();
        assert_eq!(resolved, Some(def("stored.upstream")));
    }

    #[test]
    fn test_dangling_reference_is_not_found() {
        let store = store();
        let route = Route {
            upstream: UpstreamBinding::reference("missing"),
            ..Route::default()
        };
        let err = Resolver::new(&store).resolve_upstream(&route).unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                kind: EntityKind::Upstream,
                id: "missing".into()
            }
        );
    }

    #[test]
    fn test_service_chain() {
        let store = store();
        let resolver = Resolver::new(&store);

        let via_inline = Route {
            service_id: Some("s-inline".into()),
            ..Route::default()
        };
        assert_eq!(
            resolver.resolve_upstream(&via_inline).unwrap(),
            Some(def("service.inline"))
        );

        let via_ref = Route {
            service_id: Some("s-ref".into()),
            ..Route::default()
        };
        assert_eq!(
            resolver.resolve_upstream(&via_ref).unwrap(),
            Some(def("stored.upstream"))
        );

        let dangling = Route {
            service_id: Some("nope".into()),
            ..Route::default()
        };
        assert!(matches!(
            resolver.resolve_upstream(&dangling),
            Err(EngineError::NotFound {
                kind: EntityKind::Service,
                ..
            })
        ));
    }

    #[test]
    fn test_no_upstream_anywhere() {
        let store = store();
        assert_eq!(
            Resolver::new(&store).resolve_upstream(&Route::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_route_fetches_service_even_with_own_upstream() {
        let store = store();
        let route = Route {
            upstream: UpstreamBinding::reference("u1"),
            service_id: Some("s-inline".into()),
            ..Route::default()
        };
        let resolved = Resolver::new(&store).resolve_route(&route).unwrap();
        assert_eq!(resolved.upstream, Some(def("stored.upstream")));
        assert_eq!(resolved.service.unwrap().base.id_str(), "s-inline");
    }
}
